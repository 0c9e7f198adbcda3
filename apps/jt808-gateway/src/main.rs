//! JT/T 808 网关进程入口：配置 → 日志 → 存储 → 保活 → TCP 服务。

use std::sync::Arc;

use jt808_config::GatewayConfig;
use jt808_protocol::{
    GatewayServer, KeepaliveTimer, MsgProcessor, ProcessorOptions, TcpServerConfig,
};
use jt808_storage::{DeviceStore, GisStore, InMemoryDeviceStore, InMemoryGisStore};
use jt808_telemetry::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = GatewayConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let devices: Arc<dyn DeviceStore> = Arc::new(InMemoryDeviceStore::new());
    let gis: Arc<dyn GisStore> = Arc::new(InMemoryGisStore::new(config.gis_ring_capacity));
    let keepalive = KeepaliveTimer::spawn(Arc::clone(&devices));

    let processor = Arc::new(MsgProcessor::new(
        Arc::clone(&devices),
        gis,
        keepalive,
        ProcessorOptions {
            keepalive_interval: config.keepalive_interval,
            debug_payload_logging: config.debug_payload_logging,
        },
    ));

    info!(
        keepalive_seconds = config.keepalive_interval.as_secs(),
        gis_ring_capacity = config.gis_ring_capacity,
        "starting jt808 gateway"
    );
    let server = GatewayServer::new(
        TcpServerConfig {
            listen_addr: config.listen_addr.clone(),
        },
        processor,
    );
    server.run().await?;
    Ok(())
}
