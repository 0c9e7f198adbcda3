//! # 协议处理模块
//!
//! JT/T 808 网关的消息处理核心：
//! - **消息处理器** (`processor`)：消息 ID → {解码、应答构造} 的调用表，
//!   按消息语义读写终端注册中心、定位缓存与保活定时器
//! - **保活定时器** (`keepalive`)：单监督任务 + 最小堆，心跳刷新、
//!   到期移除
//! - **TCP 服务器** (`tcp_server`)：监听端口，逐连接收帧、分发、回帧
//!
//! ## 数据流
//!
//! ```text
//! TcpServer ── 帧 ──▶ framing/PacketData ──▶ MsgProcessor
//!                                                │
//!                              DeviceStore / GisStore / KeepaliveTimer
//!                                                │
//!                            ProcessData.outgoing ──▶ 编码回帧
//! ```

pub mod error;
pub mod keepalive;
pub mod processor;
pub mod tcp_server;

pub use error::ProtocolError;
pub use keepalive::KeepaliveTimer;
pub use processor::{MsgProcessor, ProcessData, ProcessorOptions, gen_auth_code};
pub use tcp_server::{GatewayServer, TcpServerConfig};
