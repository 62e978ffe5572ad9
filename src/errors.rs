use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum SnaplinkError {
    AliasConflict(String),
    GenerationExhausted(String),
    NotFound(String),
    RateLimited { retry_after_secs: u64 },
    Validation(String),
    StorageOperation(String),
    FileOperation(String),
    Serialization(String),
    Config(String),
}

impl SnaplinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SnaplinkError::AliasConflict(_) => "E001",
            SnaplinkError::GenerationExhausted(_) => "E002",
            SnaplinkError::NotFound(_) => "E003",
            SnaplinkError::RateLimited { .. } => "E004",
            SnaplinkError::Validation(_) => "E005",
            SnaplinkError::StorageOperation(_) => "E006",
            SnaplinkError::FileOperation(_) => "E007",
            SnaplinkError::Serialization(_) => "E008",
            SnaplinkError::Config(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SnaplinkError::AliasConflict(_) => "Alias Conflict",
            SnaplinkError::GenerationExhausted(_) => "Code Generation Exhausted",
            SnaplinkError::NotFound(_) => "Resource Not Found",
            SnaplinkError::RateLimited { .. } => "Rate Limit Exceeded",
            SnaplinkError::Validation(_) => "Validation Error",
            SnaplinkError::StorageOperation(_) => "Storage Operation Error",
            SnaplinkError::FileOperation(_) => "File Operation Error",
            SnaplinkError::Serialization(_) => "Serialization Error",
            SnaplinkError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SnaplinkError::AliasConflict(msg) => msg,
            SnaplinkError::GenerationExhausted(msg) => msg,
            SnaplinkError::NotFound(msg) => msg,
            SnaplinkError::RateLimited { .. } => "Rate limit exceeded, retry later",
            SnaplinkError::Validation(msg) => msg,
            SnaplinkError::StorageOperation(msg) => msg,
            SnaplinkError::FileOperation(msg) => msg,
            SnaplinkError::Serialization(msg) => msg,
            SnaplinkError::Config(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    pub fn http_status(&self) -> StatusCode {
        match self {
            SnaplinkError::AliasConflict(_) | SnaplinkError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            SnaplinkError::NotFound(_) => StatusCode::NOT_FOUND,
            SnaplinkError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SnaplinkError::GenerationExhausted(_)
            | SnaplinkError::StorageOperation(_)
            | SnaplinkError::FileOperation(_)
            | SnaplinkError::Serialization(_)
            | SnaplinkError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于启动失败时打印到终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SnaplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SnaplinkError {}

// 便捷的构造函数
impl SnaplinkError {
    pub fn alias_conflict<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::AliasConflict(msg.into())
    }

    pub fn generation_exhausted<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::GenerationExhausted(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::NotFound(msg.into())
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        SnaplinkError::RateLimited { retry_after_secs }
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Validation(msg.into())
    }

    pub fn storage_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::StorageOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Config(msg.into())
    }
}

impl From<std::io::Error> for SnaplinkError {
    fn from(err: std::io::Error) -> Self {
        SnaplinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SnaplinkError {
    fn from(err: serde_json::Error) -> Self {
        SnaplinkError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SnaplinkError {
    fn from(err: config::ConfigError) -> Self {
        SnaplinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnaplinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            SnaplinkError::alias_conflict("a"),
            SnaplinkError::generation_exhausted("b"),
            SnaplinkError::not_found("c"),
            SnaplinkError::rate_limited(1),
            SnaplinkError::validation("d"),
            SnaplinkError::storage_operation("e"),
            SnaplinkError::file_operation("f"),
            SnaplinkError::serialization("g"),
            SnaplinkError::config("h"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            SnaplinkError::alias_conflict("taken").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SnaplinkError::not_found("gone").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SnaplinkError::rate_limited(3).http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            SnaplinkError::generation_exhausted("retries").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = SnaplinkError::not_found("Short URL 'abc' not found");
        assert_eq!(
            err.to_string(),
            "Resource Not Found: Short URL 'abc' not found"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SnaplinkError = io.into();
        assert!(matches!(err, SnaplinkError::FileOperation(_)));
    }
}
