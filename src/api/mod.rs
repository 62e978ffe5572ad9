pub mod error_code;
pub mod handlers;
pub mod helpers;
pub mod routes;

pub use error_code::ErrorCode;
pub use helpers::ApiResponse;
pub use routes::{API_PREFIX, configure};
