//! 消息载荷类型与出入站枚举。
//!
//! 每个支持的消息 ID 对应一个类型化载荷，统一提供：
//! - `decode`：从 `PacketData` 解出入站载荷
//! - `encode_body`：把出站载荷编码为消息体字节
//! - `reply_to`：按入站消息头构造应答载荷（复制流水号等应答字段）

mod msg_0001;
mod msg_0002;
mod msg_0003;
mod msg_0100;
mod msg_0102;
mod msg_0200;
mod msg_8001;
mod msg_8100;

pub use msg_0001::Msg0001;
pub use msg_0002::Msg0002;
pub use msg_0003::Msg0003;
pub use msg_0100::Msg0100;
pub use msg_0102::Msg0102;
pub use msg_0200::Msg0200;
pub use msg_8001::Msg8001;
pub use msg_8100::Msg8100;

use serde::Serialize;

use crate::error::CodecError;
use crate::header::MsgHeader;

/// 支持的消息 ID。
pub mod msg_ids {
    /// 终端通用应答
    pub const TERMINAL_GENERAL_ACK: u16 = 0x0001;
    /// 终端心跳
    pub const TERMINAL_HEARTBEAT: u16 = 0x0002;
    /// 终端注销
    pub const TERMINAL_LOGOUT: u16 = 0x0003;
    /// 终端注册
    pub const TERMINAL_REGISTER: u16 = 0x0100;
    /// 终端鉴权
    pub const TERMINAL_AUTH: u16 = 0x0102;
    /// 位置信息汇报
    pub const LOCATION_REPORT: u16 = 0x0200;
    /// 平台通用应答
    pub const PLATFORM_GENERAL_ACK: u16 = 0x8001;
    /// 终端注册应答
    pub const REGISTER_ACK: u16 = 0x8100;
}

/// 应答结果码。
pub mod results {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    /// 车辆已被注册
    pub const CAR_ALREADY_REGISTERED: u8 = 2;
    /// 终端已被注册
    pub const DEVICE_ALREADY_REGISTERED: u8 = 3;
}

/// 一个已去定界、已反转义的报文：消息头加消息体原文。
#[derive(Debug, Clone)]
pub struct PacketData {
    pub header: MsgHeader,
    pub body: Vec<u8>,
}

impl PacketData {
    /// 从 `header || body` 载荷解出报文，并校验头部声明的体长度。
    pub fn parse(payload: &[u8]) -> Result<Self, CodecError> {
        let (header, body_start) = MsgHeader::decode(payload)?;
        let body = payload[body_start..].to_vec();
        let declared = usize::from(header.attr.body_length);
        if declared != body.len() {
            return Err(CodecError::BodyLengthMismatch {
                declared,
                actual: body.len(),
            });
        }
        Ok(Self { header, body })
    }
}

/// 入站消息。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundMsg {
    GeneralAck(Msg0001),
    Heartbeat(Msg0002),
    Logout(Msg0003),
    Register(Msg0100),
    Authenticate(Msg0102),
    LocationReport(Msg0200),
    RegisterAck(Msg8100),
}

impl InboundMsg {
    pub fn header(&self) -> &MsgHeader {
        match self {
            Self::GeneralAck(m) => &m.header,
            Self::Heartbeat(m) => &m.header,
            Self::Logout(m) => &m.header,
            Self::Register(m) => &m.header,
            Self::Authenticate(m) => &m.header,
            Self::LocationReport(m) => &m.header,
            Self::RegisterAck(m) => &m.header,
        }
    }

    pub fn msg_id(&self) -> u16 {
        self.header().msg_id
    }
}

/// 出站消息。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundMsg {
    GeneralAck(Msg8001),
    RegisterAck(Msg8100),
    Authenticate(Msg0102),
}

impl OutboundMsg {
    pub fn header(&self) -> &MsgHeader {
        match self {
            Self::GeneralAck(m) => &m.header,
            Self::RegisterAck(m) => &m.header,
            Self::Authenticate(m) => &m.header,
        }
    }

    pub fn msg_id(&self) -> u16 {
        self.header().msg_id
    }

    /// 编码为 `header || body` 载荷（未转义、未加校验）。
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let body = match self {
            Self::GeneralAck(m) => m.encode_body()?,
            Self::RegisterAck(m) => m.encode_body()?,
            Self::Authenticate(m) => m.encode_body()?,
        };
        let mut payload = self.header().encode(body.len())?;
        payload.extend_from_slice(&body);
        Ok(payload)
    }
}
