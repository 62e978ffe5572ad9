//! URL 验证模块
//!
//! 规范化并验证目标 URL，阻止危险协议

use url::Url;

/// URL 验证错误
#[derive(Debug)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => {
                write!(f, "Dangerous protocol blocked: {}", proto)
            }
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// 危险协议列表
const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 规范化 URL
///
/// 1. 去除首尾空白
/// 2. 拒绝危险协议
/// 3. 没有协议时补全 `https://`
/// 4. 非 http/https 协议直接拒绝
/// 5. 解析验证格式
pub fn normalize_url(raw: &str) -> Result<String, UrlValidationError> {
    let url = raw.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url_lower = url.to_lowercase();

    for proto in DANGEROUS_PROTOCOLS {
        if url_lower.starts_with(proto) {
            return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
        }
    }

    let normalized = if url_lower.starts_with("http://") || url_lower.starts_with("https://") {
        url.to_string()
    } else if let Some(scheme) = explicit_scheme(&url_lower) {
        return Err(UrlValidationError::InvalidProtocol(format!("{}:", scheme)));
    } else {
        format!("https://{}", url)
    };

    Url::parse(&normalized).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    Ok(normalized)
}

/// 识别 `scheme:` 前缀；`host:port` 形式（冒号后为数字）不算协议
fn explicit_scheme(url: &str) -> Option<&str> {
    let (scheme, rest) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let scheme_chars = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let looks_like_port = rest.chars().next().is_some_and(|c| c.is_ascii_digit());

    (starts_alpha && scheme_chars && !looks_like_port).then_some(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert_eq!(
            normalize_url("http://example.com").unwrap(),
            "http://example.com"
        );
        assert_eq!(
            normalize_url("https://example.com/path?query=1").unwrap(),
            "https://example.com/path?query=1"
        );
        assert!(normalize_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn test_missing_scheme_gets_https() {
        assert_eq!(
            normalize_url("  example.com/a  ").unwrap(),
            "https://example.com/a"
        );
        assert_eq!(
            normalize_url("localhost:8080/x").unwrap(),
            "https://localhost:8080/x"
        );
    }

    #[test]
    fn test_dangerous_protocols() {
        assert!(matches!(
            normalize_url("javascript:alert(1)"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            normalize_url("data:text/html,<script>alert(1)</script>"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
        assert!(matches!(
            normalize_url("JAVASCRIPT:alert(1)"),
            Err(UrlValidationError::DangerousProtocol(_))
        ));
    }

    #[test]
    fn test_invalid_protocols() {
        assert!(matches!(
            normalize_url("ftp://example.com"),
            Err(UrlValidationError::InvalidProtocol(_))
        ));
        assert!(matches!(
            normalize_url("mailto:test@example.com"),
            Err(UrlValidationError::InvalidProtocol(_))
        ));
    }

    #[test]
    fn test_empty_url() {
        assert!(matches!(normalize_url(""), Err(UrlValidationError::EmptyUrl)));
        assert!(matches!(
            normalize_url("   "),
            Err(UrlValidationError::EmptyUrl)
        ));
    }
}
