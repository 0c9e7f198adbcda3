//! 终端注册应答。

use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};
use crate::header::MsgHeader;
use crate::message::{PacketData, msg_ids, results};

/// 0x8100 终端注册应答。
///
/// server 侧作为 0x0100 的应答发出；本网关作为 client 接入上级平台时
/// 也会收到该消息并回以 0x0102。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg8100 {
    pub header: MsgHeader,
    /// 应答流水号：对应注册消息的流水号
    pub ack_serial_number: u16,
    /// 0 成功，2 车辆已被注册，3 终端已被注册
    pub result: u8,
    /// 注册成功时下发的鉴权码
    pub auth_code: String,
}

impl Msg8100 {
    pub fn decode(packet: &PacketData) -> Result<Self, CodecError> {
        let mut r = FieldReader::new(&packet.body);
        let ack_serial_number = r.read_u16()?;
        let result = r.read_u8()?;
        let auth_code = r.read_string(r.remaining())?;
        Ok(Self {
            header: packet.header.clone(),
            ack_serial_number,
            result,
            auth_code,
        })
    }

    pub fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
        let mut w = FieldWriter::new();
        w.write_u16(self.ack_serial_number);
        w.write_u8(self.result);
        w.write_bytes(self.auth_code.as_bytes());
        Ok(w.into_inner())
    }

    /// 按入站注册消息头构造应答：鉴权码由 handler 在校验通过后填充。
    pub fn reply_to(header: &MsgHeader) -> Self {
        Self {
            header: header.reply(msg_ids::REGISTER_ACK),
            ack_serial_number: header.serial_number,
            result: results::SUCCESS,
            auth_code: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MsgAttr, ProtocolVersion};

    #[test]
    fn auth_code_occupies_rest_of_body() {
        let header = MsgHeader {
            msg_id: msg_ids::REGISTER_ACK,
            attr: MsgAttr {
                body_length: 13,
                encryption: 0,
                fragmented: false,
                version_flag: false,
            },
            version: ProtocolVersion::V2013,
            protocol_version: None,
            phone_number: "013800138000".to_string(),
            serial_number: 7,
            fragment: None,
        };
        let mut body = vec![0x00, 0x07, 0x00];
        body.extend_from_slice(b"3184567117");
        let packet = PacketData {
            header,
            body: body.clone(),
        };
        let msg = Msg8100::decode(&packet).expect("decode");
        assert_eq!(msg.ack_serial_number, 7);
        assert_eq!(msg.result, results::SUCCESS);
        assert_eq!(msg.auth_code, "3184567117");
        assert_eq!(msg.encode_body().expect("encode"), body);
    }

    #[test]
    fn failure_reply_carries_no_auth_code() {
        let header = MsgHeader {
            msg_id: msg_ids::TERMINAL_REGISTER,
            attr: MsgAttr {
                body_length: 45,
                encryption: 0,
                fragmented: false,
                version_flag: false,
            },
            version: ProtocolVersion::V2013,
            protocol_version: None,
            phone_number: "013800138001".to_string(),
            serial_number: 8,
            fragment: None,
        };
        let mut ack = Msg8100::reply_to(&header);
        ack.result = results::CAR_ALREADY_REGISTERED;
        let body = ack.encode_body().expect("encode");
        assert_eq!(body, vec![0x00, 0x08, results::CAR_ALREADY_REGISTERED]);
    }
}
