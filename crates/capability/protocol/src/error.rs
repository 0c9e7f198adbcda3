//! 协议处理错误类型定义
//!
//! 错误种类决定调用方对连接的处置：不支持的消息与解码失败只丢帧，
//! 终端未注册和主动关闭要求断开连接。鉴权失败不在此列，它通过应答
//! 结果码加 `ProcessData::close_after_reply` 表达。

use jt808_codec::CodecError;
use jt808_storage::StorageError;

/// 消息处理错误。
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 消息 ID 无对应处理项；忽略该帧，保持连接
    #[error("unsupported message id {0:#06x}")]
    UnsupportedMessage(u16),

    /// 消息体按头部版本解码失败；丢弃该帧，保持连接
    #[error("decode msg {msg_id:#06x} failed")]
    Decode {
        msg_id: u16,
        #[source]
        source: CodecError,
    },

    /// 应答序列化失败；丢弃应答，保持连接
    #[error("encode msg {msg_id:#06x} failed")]
    Encode {
        msg_id: u16,
        #[source]
        source: CodecError,
    },

    /// handler 需要的终端记录不存在；终端不合法，关闭连接
    #[error("device not found, phone={0}")]
    DeviceNotFound(String),

    /// client 侧无法继续处理；主动关闭连接
    #[error("active close, phone={0}")]
    ActiveClose(String),

    /// 存储层故障
    #[error(transparent)]
    Storage(#[from] StorageError),
}
