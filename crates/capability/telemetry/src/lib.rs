//! 追踪初始化与进程级计数。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub frames_received: u64,
    pub frames_sent: u64,
    pub decode_failures: u64,
    pub unsupported_messages: u64,
    pub devices_registered: u64,
    pub devices_removed: u64,
    pub keepalive_timeouts: u64,
}

/// 基础指标。
pub struct GatewayMetrics {
    frames_received: AtomicU64,
    frames_sent: AtomicU64,
    decode_failures: AtomicU64,
    unsupported_messages: AtomicU64,
    devices_registered: AtomicU64,
    devices_removed: AtomicU64,
    keepalive_timeouts: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            frames_sent: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            unsupported_messages: AtomicU64::new(0),
            devices_registered: AtomicU64::new(0),
            devices_removed: AtomicU64::new(0),
            keepalive_timeouts: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            unsupported_messages: self.unsupported_messages.load(Ordering::Relaxed),
            devices_registered: self.devices_registered.load(Ordering::Relaxed),
            devices_removed: self.devices_removed.load(Ordering::Relaxed),
            keepalive_timeouts: self.keepalive_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<GatewayMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static GatewayMetrics {
    METRICS.get_or_init(GatewayMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 记录收到一帧。
pub fn record_frame_received() {
    metrics().frames_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录发出一帧。
pub fn record_frame_sent() {
    metrics().frames_sent.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次解码失败。
pub fn record_decode_failure() {
    metrics().decode_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次不支持的消息 ID。
pub fn record_unsupported_message() {
    metrics()
        .unsupported_messages
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录一次终端注册。
pub fn record_device_registered() {
    metrics().devices_registered.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次终端移除（注销、鉴权失败或保活超时）。
pub fn record_device_removed() {
    metrics().devices_removed.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次保活超时。
pub fn record_keepalive_timeout() {
    metrics().keepalive_timeouts.fetch_add(1, Ordering::Relaxed);
}
