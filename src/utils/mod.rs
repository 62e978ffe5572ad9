pub mod ip;
pub mod url_validator;

pub use ip::client_identity;
pub use url_validator::normalize_url;

/// 自定义别名最大长度
pub const MAX_ALIAS_LENGTH: usize = 64;

/// 校验自定义别名：1-64 个字符，仅允许字母、数字、下划线和连字符
pub fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias.len() <= MAX_ALIAS_LENGTH
        && alias
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
