//! 平台通用应答。

use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};
use crate::header::MsgHeader;
use crate::message::{PacketData, msg_ids, results};

/// 0x8001 平台通用应答。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg8001 {
    pub header: MsgHeader,
    /// 应答流水号：对应终端消息的流水号
    pub ack_serial_number: u16,
    /// 应答 ID：对应终端消息的 ID
    pub ack_msg_id: u16,
    /// 0 成功，1 失败
    pub result: u8,
}

impl Msg8001 {
    pub fn decode(packet: &PacketData) -> Result<Self, CodecError> {
        let mut r = FieldReader::new(&packet.body);
        Ok(Self {
            header: packet.header.clone(),
            ack_serial_number: r.read_u16()?,
            ack_msg_id: r.read_u16()?,
            result: r.read_u8()?,
        })
    }

    pub fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
        let mut w = FieldWriter::new();
        w.write_u16(self.ack_serial_number);
        w.write_u16(self.ack_msg_id);
        w.write_u8(self.result);
        Ok(w.into_inner())
    }

    /// 按入站消息头构造应答：回填流水号与消息 ID，结果默认成功。
    pub fn reply_to(header: &MsgHeader) -> Self {
        Self {
            header: header.reply(msg_ids::PLATFORM_GENERAL_ACK),
            ack_serial_number: header.serial_number,
            ack_msg_id: header.msg_id,
            result: results::SUCCESS,
        }
    }
}
