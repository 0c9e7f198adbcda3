//! 终端心跳。

use serde::Serialize;

use crate::error::CodecError;
use crate::header::MsgHeader;
use crate::message::PacketData;

/// 0x0002 终端心跳，消息体为空。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg0002 {
    pub header: MsgHeader,
}

impl Msg0002 {
    pub fn decode(packet: &PacketData) -> Result<Self, CodecError> {
        Ok(Self {
            header: packet.header.clone(),
        })
    }

    pub fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
        Ok(Vec::new())
    }
}
