//! 终端鉴权。

use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};
use crate::header::{MsgHeader, ProtocolVersion};
use crate::message::{PacketData, msg_ids};

const IMEI_LEN: usize = 15;
const SOFTWARE_VERSION_LEN: usize = 20;

/// 0x0102 终端鉴权。
///
/// 2019 版消息体为鉴权码长度 + 鉴权码 + IMEI(15) + 软件版本(20)；
/// 此前版本整个消息体即鉴权码。作为 client 对 0x8100 的应答时亦用本类型。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg0102 {
    pub header: MsgHeader,
    pub auth_code: String,
    pub imei: Option<String>,
    pub software_version: Option<String>,
}

impl Msg0102 {
    pub fn decode(packet: &PacketData) -> Result<Self, CodecError> {
        let mut r = FieldReader::new(&packet.body);
        let (auth_code, imei, software_version) =
            if packet.header.version == ProtocolVersion::V2019 {
                let auth_len = usize::from(r.read_u8()?);
                (
                    r.read_string(auth_len)?,
                    Some(r.read_string(IMEI_LEN)?),
                    Some(r.read_string(SOFTWARE_VERSION_LEN)?),
                )
            } else {
                (r.read_string(r.remaining())?, None, None)
            };
        Ok(Self {
            header: packet.header.clone(),
            auth_code,
            imei,
            software_version,
        })
    }

    pub fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
        let mut w = FieldWriter::new();
        if self.header.version == ProtocolVersion::V2019 {
            let auth = self.auth_code.as_bytes();
            if auth.len() > usize::from(u8::MAX) {
                return Err(CodecError::FieldOverflow {
                    len: auth.len(),
                    width: usize::from(u8::MAX),
                });
            }
            w.write_u8(auth.len() as u8);
            w.write_bytes(auth);
            w.write_string(self.imei.as_deref().unwrap_or_default(), IMEI_LEN)?;
            w.write_string(
                self.software_version.as_deref().unwrap_or_default(),
                SOFTWARE_VERSION_LEN,
            )?;
        } else {
            w.write_bytes(self.auth_code.as_bytes());
        }
        Ok(w.into_inner())
    }

    /// client 侧对 0x8100 注册应答的回应：鉴权码等字段由 handler 填充。
    pub fn reply_to(header: &MsgHeader) -> Self {
        Self {
            header: header.reply(msg_ids::TERMINAL_AUTH),
            auth_code: String::new(),
            imei: None,
            software_version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MsgAttr;

    fn packet(version: ProtocolVersion, body: Vec<u8>) -> PacketData {
        PacketData {
            header: MsgHeader {
                msg_id: msg_ids::TERMINAL_AUTH,
                attr: MsgAttr {
                    body_length: body.len() as u16,
                    encryption: 0,
                    fragmented: false,
                    version_flag: version == ProtocolVersion::V2019,
                },
                version,
                protocol_version: (version == ProtocolVersion::V2019).then_some(1),
                phone_number: "013800138000".to_string(),
                serial_number: 2,
                fragment: None,
            },
            body,
        }
    }

    #[test]
    fn pre_2019_body_is_the_auth_code() {
        let packet = packet(ProtocolVersion::V2013, b"3184567117".to_vec());
        let msg = Msg0102::decode(&packet).expect("decode");
        assert_eq!(msg.auth_code, "3184567117");
        assert_eq!(msg.imei, None);
        assert_eq!(msg.encode_body().expect("encode"), packet.body);
    }

    #[test]
    fn v2019_round_trips_imei_and_version() {
        let msg = Msg0102 {
            header: packet(ProtocolVersion::V2019, Vec::new()).header,
            auth_code: "3184567117".to_string(),
            imei: Some("123456789012345".to_string()),
            software_version: Some("v2.1.0".to_string()),
        };
        let body = msg.encode_body().expect("encode");
        assert_eq!(body.len(), 1 + 10 + 15 + 20);
        let decoded = Msg0102::decode(&packet(ProtocolVersion::V2019, body)).expect("decode");
        assert_eq!(decoded.auth_code, "3184567117");
        assert_eq!(decoded.imei.as_deref(), Some("123456789012345"));
        assert_eq!(decoded.software_version.as_deref(), Some("v2.1.0"));
    }
}
