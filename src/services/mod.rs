//! Service layer for business logic
//!
//! HTTP handlers delegate to `LinkService`; tests drive it directly.

mod link_service;

pub use link_service::*;
