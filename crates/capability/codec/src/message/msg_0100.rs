//! 终端注册。

use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};
use crate::header::{MsgHeader, ProtocolVersion};
use crate::message::PacketData;

/// 2013 版厂商+型号+终端 ID+车牌颜色的最小占位，体长超出即为 2013。
const V2013_TAIL_MIN: usize = 5 + 20 + 7 + 1;

/// 0x0100 终端注册。
///
/// 厂商 ID / 终端型号 / 终端 ID 的字段宽度随版本变化：
/// 2019 为 11/30/30，2013 为 5/20/7，2011 为 5/8/7。2013 与 2011 头部
/// 无法区分，按省市域之后的剩余体长判别，命中 2011 时回写头部版本。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg0100 {
    pub header: MsgHeader,
    /// 省域 ID，GBT2260 行政区号前 2 位
    pub province_id: u16,
    /// 市县域 ID，GBT2260 行政区号后 4 位
    pub city_id: u16,
    pub manufacturer_id: String,
    pub device_model: String,
    pub device_id: String,
    /// 车牌颜色，JTT415-2006，未上牌填 0
    pub plate_color: u8,
    pub plate_number: String,
}

impl Msg0100 {
    fn field_widths(version: ProtocolVersion) -> (usize, usize, usize) {
        match version {
            ProtocolVersion::V2019 => (11, 30, 30),
            ProtocolVersion::V2013 => (5, 20, 7),
            ProtocolVersion::V2011 => (5, 8, 7),
        }
    }

    pub fn decode(packet: &PacketData) -> Result<Self, CodecError> {
        let mut header = packet.header.clone();
        let mut r = FieldReader::new(&packet.body);
        let province_id = r.read_u16()?;
        let city_id = r.read_u16()?;

        if header.version != ProtocolVersion::V2019 {
            header.version = if r.remaining() > V2013_TAIL_MIN {
                ProtocolVersion::V2013
            } else {
                ProtocolVersion::V2011
            };
        }
        let (manu_len, model_len, id_len) = Self::field_widths(header.version);

        let manufacturer_id = r.read_string(manu_len)?;
        let device_model = r.read_string(model_len)?;
        let device_id = r.read_string(id_len)?;
        let plate_color = r.read_u8()?;
        let plate_number = r.read_gbk(r.remaining())?;

        Ok(Self {
            header,
            province_id,
            city_id,
            manufacturer_id,
            device_model,
            device_id,
            plate_color,
            plate_number,
        })
    }

    pub fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
        let (manu_len, model_len, id_len) = Self::field_widths(self.header.version);
        let mut w = FieldWriter::new();
        w.write_u16(self.province_id);
        w.write_u16(self.city_id);
        w.write_string(&self.manufacturer_id, manu_len)?;
        w.write_string(&self.device_model, model_len)?;
        w.write_string(&self.device_id, id_len)?;
        w.write_u8(self.plate_color);
        w.write_gbk(&self.plate_number);
        Ok(w.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MsgAttr;

    fn packet(version: ProtocolVersion, body: Vec<u8>) -> PacketData {
        PacketData {
            header: MsgHeader {
                msg_id: 0x0100,
                attr: MsgAttr {
                    body_length: body.len() as u16,
                    encryption: 0,
                    fragmented: false,
                    version_flag: version == ProtocolVersion::V2019,
                },
                version,
                protocol_version: (version == ProtocolVersion::V2019).then_some(1),
                phone_number: "013800138000".to_string(),
                serial_number: 7,
                fragment: None,
            },
            body,
        }
    }

    fn register_body_2013() -> Vec<u8> {
        let mut body = vec![0x00, 0x2c, 0x01, 0x01];
        body.extend_from_slice(b"ABCDE");
        body.extend_from_slice(b"MODEL-2013-VER-A\x00\x00\x00\x00");
        body.extend_from_slice(b"DEV0001");
        body.push(0x01);
        body.extend_from_slice(&[0xbe, 0xa9, 0x41, 0x31, 0x32, 0x33, 0x34, 0x35]); // 京A12345
        body
    }

    #[test]
    fn decode_2013_register() {
        let packet = packet(ProtocolVersion::V2013, register_body_2013());
        let msg = Msg0100::decode(&packet).expect("decode");
        assert_eq!(msg.header.version, ProtocolVersion::V2013);
        assert_eq!(msg.province_id, 0x002c);
        assert_eq!(msg.city_id, 0x0101);
        assert_eq!(msg.manufacturer_id, "ABCDE");
        assert_eq!(msg.device_model, "MODEL-2013-VER-A");
        assert_eq!(msg.device_id, "DEV0001");
        assert_eq!(msg.plate_color, 1);
        assert_eq!(msg.plate_number, "京A12345");
    }

    #[test]
    fn encode_2013_register_is_canonical() {
        let body = register_body_2013();
        let msg = Msg0100::decode(&packet(ProtocolVersion::V2013, body.clone())).expect("decode");
        assert_eq!(msg.encode_body().expect("encode"), body);
    }

    #[test]
    fn decode_2011_register_rewrites_version() {
        let mut body = vec![0x00, 0x2c, 0x01, 0x01];
        body.extend_from_slice(b"ABCDE");
        body.extend_from_slice(b"MOD-2011");
        body.extend_from_slice(b"DEV0001");
        body.push(0x01);
        body.extend_from_slice(&[0xbe, 0xa9, 0x41, 0x31, 0x32, 0x33, 0x34, 0x35]);
        let msg = Msg0100::decode(&packet(ProtocolVersion::V2013, body)).expect("decode");
        assert_eq!(msg.header.version, ProtocolVersion::V2011);
        assert_eq!(msg.device_model, "MOD-2011");
        assert_eq!(msg.device_id, "DEV0001");
        assert_eq!(msg.plate_number, "京A12345");
    }

    #[test]
    fn threshold_remaining_length_falls_back_to_2011() {
        // 2013 字段宽度但车牌为空：省市域之后恰好剩 33 字节，
        // 启发式判为 2011（继承自既有部署的行为，这里固定住）。
        let mut body = vec![0x00, 0x2c, 0x01, 0x01];
        body.extend_from_slice(b"ABCDE");
        body.extend_from_slice(b"MODEL-2013-VER-B\x00\x00\x00\x00");
        body.extend_from_slice(b"DEV0002");
        body.push(0x01);
        assert_eq!(body.len() - 4, 33);
        let msg = Msg0100::decode(&packet(ProtocolVersion::V2013, body)).expect("decode");
        assert_eq!(msg.header.version, ProtocolVersion::V2011);
        assert_eq!(msg.manufacturer_id, "ABCDE");
    }

    #[test]
    fn register_round_trips_in_2019() {
        let msg = Msg0100 {
            header: packet(ProtocolVersion::V2019, Vec::new()).header,
            province_id: 0x002c,
            city_id: 0x0101,
            manufacturer_id: "MANUFAC0001".to_string(),
            device_model: "MODEL-2019-EDITION".to_string(),
            device_id: "DEV2019000001".to_string(),
            plate_color: 2,
            plate_number: "京B54321".to_string(),
        };
        let body = msg.encode_body().expect("encode");
        assert_eq!(body.len(), 2 + 2 + 11 + 30 + 30 + 1 + 8);
        let decoded = Msg0100::decode(&packet(ProtocolVersion::V2019, body)).expect("decode");
        assert_eq!(decoded.manufacturer_id, msg.manufacturer_id);
        assert_eq!(decoded.device_model, msg.device_model);
        assert_eq!(decoded.device_id, msg.device_id);
        assert_eq!(decoded.plate_number, msg.plate_number);
    }
}
