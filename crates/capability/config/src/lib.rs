//! 网关运行配置加载。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 网关运行配置。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// TCP 监听地址
    pub listen_addr: String,
    /// 新注册终端的初始保活周期
    pub keepalive_interval: Duration,
    /// 每终端定位环形缓存容量
    pub gis_ring_capacity: usize,
    /// 是否以 JSON 打印出入站载荷（仅 debug 级别生效）
    pub debug_payload_logging: bool,
}

impl GatewayConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr =
            env::var("JT808_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8808".to_string());
        let keepalive_seconds = read_u64_with_default("JT808_KEEPALIVE_SECONDS", 60)?;
        let gis_ring_capacity = read_usize_with_default("JT808_GIS_RING_CAPACITY", 128)?;
        if gis_ring_capacity == 0 {
            return Err(ConfigError::Invalid(
                "JT808_GIS_RING_CAPACITY".to_string(),
                "0".to_string(),
            ));
        }
        let debug_payload_logging = read_bool_with_default("JT808_DEBUG_PAYLOAD_LOGGING", false);

        Ok(Self {
            listen_addr,
            keepalive_interval: Duration::from_secs(keepalive_seconds),
            gis_ring_capacity,
            debug_payload_logging,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
