//! 传输层会话标识。
//!
//! 会话由外层 acceptor 建立并显式传入消息处理器，核心层不自行打开连接。

use serde::Serialize;

/// 连接句柄：向连接写任务投递待发送帧的通道。
///
/// 连接关闭后发送失败，由调用方忽略或记录日志。
pub type ConnectionHandle = tokio::sync::mpsc::UnboundedSender<Vec<u8>>;

/// 承载协议类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    Tcp,
    Udp,
}

/// 单条连接的会话信息。
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub transport: TransportKind,
    pub conn: ConnectionHandle,
}
