use serde::{Deserialize, Serialize};

use crate::errors::{Result, SnaplinkError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量
/// - storage: 存储后端
/// - cache: LRU 链接缓存
/// - rate_limit: 令牌桶限流
/// - analytics: 点击统计
/// - codegen: 短码生成
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SNAP，分隔符：__
    /// 示例：SNAP__CACHE__CAPACITY=5000
    pub fn load(path: &str) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 加载配置，失败时返回错误而不是回退到默认值
    pub fn try_load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SNAP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<StaticConfig>()?)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(SnaplinkError::config("cache.capacity must be at least 1"));
        }
        if !self.rate_limit.capacity.is_finite() || self.rate_limit.capacity < 1.0 {
            return Err(SnaplinkError::config(
                "rate_limit.capacity must be at least 1",
            ));
        }
        if self.rate_limit.refill_per_minute.is_nan() || self.rate_limit.refill_per_minute <= 0.0 {
            return Err(SnaplinkError::config(
                "rate_limit.refill_per_minute must be positive",
            ));
        }
        if self.analytics.recent_clicks_cap == 0 {
            return Err(SnaplinkError::config(
                "analytics.recent_clicks_cap must be at least 1",
            ));
        }
        if self.storage.backend != "memory" && self.storage.backend != "file" {
            return Err(SnaplinkError::config(format!(
                "Unknown storage backend '{}'. Supported: memory, file",
                self.storage.backend
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub workers: usize,
}

/// 存储后端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// memory | file
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_storage_file_path")]
    pub file_path: String,
}

/// 链接缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// 令牌桶限流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// 桶容量（最大突发请求数）
    #[serde(default = "default_rate_limit_capacity")]
    pub capacity: f64,
    /// 每分钟补充的令牌数
    #[serde(default = "default_refill_per_minute")]
    pub refill_per_minute: f64,
    /// 空闲超过该时长的桶会被清理
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl RateLimitConfig {
    /// Tokens accrued per second.
    pub fn refill_per_second(&self) -> f64 {
        self.refill_per_minute / 60.0
    }
}

/// 点击统计配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// 每条链接保留的最近点击数
    #[serde(default = "default_recent_clicks_cap")]
    pub recent_clicks_cap: usize,
    /// 排行榜长度
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// 统计"最近点击"的时间窗口（秒）
    #[serde(default = "default_recent_window_secs")]
    pub recent_window_secs: u64,
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    #[serde(default = "default_codegen_max_retries")]
    pub max_retries: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

fn default_storage_file_path() -> String {
    "links.json".to_string()
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_rate_limit_capacity() -> f64 {
    100.0
}

fn default_refill_per_minute() -> f64 {
    100.0
}

fn default_idle_ttl_secs() -> u64 {
    600
}

fn default_purge_interval_secs() -> u64 {
    60
}

fn default_recent_clicks_cap() -> usize {
    50
}

fn default_top_n() -> usize {
    10
}

fn default_recent_window_secs() -> u64 {
    3600
}

fn default_codegen_max_retries() -> u32 {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_cpu_count(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            file_path: default_storage_file_path(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_rate_limit_capacity(),
            refill_per_minute: default_refill_per_minute(),
            idle_ttl_secs: default_idle_ttl_secs(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            recent_clicks_cap: default_recent_clicks_cap(),
            top_n: default_top_n(),
            recent_window_secs: default_recent_window_secs(),
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            max_retries: default_codegen_max_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.cache.capacity, 1000);
        assert_eq!(config.rate_limit.capacity, 100.0);
        assert!((config.rate_limit.refill_per_second() - 100.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(config.analytics.recent_clicks_cap, 50);
        assert_eq!(config.analytics.top_n, 10);
        assert_eq!(config.analytics.recent_window_secs, 3600);
        assert_eq!(config.storage.backend, "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.cache.capacity, 1000);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [cache]
            capacity = 16

            [rate_limit]
            refill_per_minute = 30.0
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(parsed.cache.capacity, 16);
        assert_eq!(parsed.rate_limit.capacity, 100.0);
        assert_eq!(parsed.rate_limit.refill_per_second(), 0.5);
        assert_eq!(parsed.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StaticConfig::default();
        config.cache.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = StaticConfig::default();
        config.rate_limit.refill_per_minute = 0.0;
        assert!(config.validate().is_err());

        let mut config = StaticConfig::default();
        config.storage.backend = "redis".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_rates() {
        for value in [f64::NAN, f64::INFINITY] {
            let mut config = StaticConfig::default();
            config.rate_limit.capacity = value;
            assert!(config.validate().is_err(), "capacity {} accepted", value);
        }

        let mut config = StaticConfig::default();
        config.rate_limit.refill_per_minute = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("snaplink.toml");
        std::fs::write(&path, "[analytics]\ntop_n = 3\n").unwrap();

        let config = StaticConfig::try_load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.analytics.top_n, 3);
        assert_eq!(config.analytics.recent_clicks_cap, 50);
    }
}
