//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::SnaplinkError;

/// API 错误码枚举
///
/// 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 限流
/// - 3000-3099: 链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,

    RateLimitExceeded = 2004,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidUrl = 3002,
    LinkStorageError = 3005,
    LinkCodeExhausted = 3007,
}

impl From<&SnaplinkError> for ErrorCode {
    fn from(err: &SnaplinkError) -> Self {
        match err {
            SnaplinkError::AliasConflict(_) => ErrorCode::LinkAlreadyExists,
            SnaplinkError::GenerationExhausted(_) => ErrorCode::LinkCodeExhausted,
            SnaplinkError::NotFound(_) => ErrorCode::LinkNotFound,
            SnaplinkError::RateLimited { .. } => ErrorCode::RateLimitExceeded,
            SnaplinkError::Validation(_) => ErrorCode::LinkInvalidUrl,
            SnaplinkError::StorageOperation(_)
            | SnaplinkError::FileOperation(_)
            | SnaplinkError::Serialization(_) => ErrorCode::LinkStorageError,
            SnaplinkError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}
