//! 终端通用应答。

use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};
use crate::header::MsgHeader;
use crate::message::PacketData;

/// 0x0001 终端通用应答。收到后无需回复。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg0001 {
    pub header: MsgHeader,
    /// 应答流水号：对应平台消息的流水号
    pub ack_serial_number: u16,
    /// 应答 ID：对应平台消息的 ID
    pub ack_msg_id: u16,
    /// 0 成功，1 失败，2 消息有误，3 不支持
    pub result: u8,
}

impl Msg0001 {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MsgAttr, ProtocolVersion};
    use crate::message::msg_ids;

    #[test]
    fn decode_then_encode_round_trips() {
        let header = MsgHeader {
            msg_id: msg_ids::TERMINAL_GENERAL_ACK,
            attr: MsgAttr {
                body_length: 5,
                encryption: 0,
                fragmented: false,
                version_flag: false,
            },
            version: ProtocolVersion::V2013,
            protocol_version: None,
            phone_number: "013800138000".to_string(),
            serial_number: 3,
            fragment: None,
        };
        let packet = PacketData {
            header,
            body: vec![0x00, 0x08, 0x80, 0x01, 0x00],
        };
        let msg = Msg0001::decode(&packet).expect("decode");
        assert_eq!(msg.ack_serial_number, 8);
        assert_eq!(msg.ack_msg_id, 0x8001);
        assert_eq!(msg.result, 0);
        assert_eq!(msg.encode_body().expect("encode"), packet.body);
    }
}
