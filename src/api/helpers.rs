//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::error_code::ErrorCode;
use crate::errors::SnaplinkError;

/// 统一 JSON 响应信封
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 SnaplinkError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// `RateLimited` 额外带上 `Retry-After` 头。
pub fn error_from_snaplink(err: &SnaplinkError) -> HttpResponse {
    let status = err.http_status();
    let mut response = HttpResponse::build(status);
    if let SnaplinkError::RateLimited { retry_after_secs } = err {
        response.insert_header(("Retry-After", retry_after_secs.to_string()));
    }
    response
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse::<()> {
            code: ErrorCode::from(err) as i32,
            message: err.message().to_string(),
            data: None,
        })
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 SnaplinkError。
pub fn api_result<T: Serialize>(result: Result<T, SnaplinkError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_snaplink(&e),
    }
}
