//! 位置信息汇报。

use domain::GisFix;
use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};
use crate::header::MsgHeader;
use crate::message::PacketData;

/// 状态位定义（JT/T 808 表 8.12）。
const STATUS_ACC_ON: u32 = 1;
const STATUS_POSITIONED: u32 = 1 << 1;
const STATUS_SOUTH_LATITUDE: u32 = 1 << 2;
const STATUS_WEST_LONGITUDE: u32 = 1 << 3;

/// 经纬度以 1e-6 度为单位上报。
const DEGREE_SCALE: f64 = 1e-6;

/// 0x0200 位置信息汇报。
///
/// 仅解析基本位置信息；附加信息项不拆解，原样保留以便透传。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Msg0200 {
    pub header: MsgHeader,
    pub alarm_sign: u32,
    pub status_sign: u32,
    /// 纬度原文（1e-6 度，无符号）
    pub latitude: u32,
    /// 经度原文（1e-6 度，无符号）
    pub longitude: u32,
    /// 海拔（米）
    pub altitude: u16,
    /// 速度（0.1 km/h）
    pub speed: u16,
    /// 方向（0-359）
    pub direction: u16,
    /// BCD 时间 YYMMDDhhmmss
    pub time: String,
    /// 附加信息项原文
    pub extra: Vec<u8>,
}

impl Msg0200 {
    pub fn decode(packet: &PacketData) -> Result<Self, CodecError> {
        let mut r = FieldReader::new(&packet.body);
        Ok(Self {
            header: packet.header.clone(),
            alarm_sign: r.read_u32()?,
            status_sign: r.read_u32()?,
            latitude: r.read_u32()?,
            longitude: r.read_u32()?,
            altitude: r.read_u16()?,
            speed: r.read_u16()?,
            direction: r.read_u16()?,
            time: r.read_bcd(6)?,
            extra: r.read_rest().to_vec(),
        })
    }

    pub fn encode_body(&self) -> Result<Vec<u8>, CodecError> {
        let mut w = FieldWriter::new();
        w.write_u32(self.alarm_sign);
        w.write_u32(self.status_sign);
        w.write_u32(self.latitude);
        w.write_u32(self.longitude);
        w.write_u16(self.altitude);
        w.write_u16(self.speed);
        w.write_u16(self.direction);
        w.write_bcd(&self.time, 6)?;
        w.write_bytes(&self.extra);
        Ok(w.into_inner())
    }

    /// 解码状态位并换算单位，产出一条定位记录。
    pub fn to_fix(&self) -> GisFix {
        let south = self.status_sign & STATUS_SOUTH_LATITUDE != 0;
        let west = self.status_sign & STATUS_WEST_LONGITUDE != 0;
        let latitude = f64::from(self.latitude) * DEGREE_SCALE * if south { -1.0 } else { 1.0 };
        let longitude = f64::from(self.longitude) * DEGREE_SCALE * if west { -1.0 } else { 1.0 };
        GisFix {
            latitude,
            longitude,
            speed_kmh: f64::from(self.speed) / 10.0,
            direction: self.direction,
            altitude_m: self.altitude,
            time: self.time.clone(),
            status_sign: self.status_sign,
            acc_on: self.status_sign & STATUS_ACC_ON != 0,
            positioned: self.status_sign & STATUS_POSITIONED != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MsgAttr, ProtocolVersion};

    fn packet(body: Vec<u8>) -> PacketData {
        PacketData {
            header: MsgHeader {
                msg_id: 0x0200,
                attr: MsgAttr {
                    body_length: body.len() as u16,
                    encryption: 0,
                    fragmented: false,
                    version_flag: false,
                },
                version: ProtocolVersion::V2013,
                protocol_version: None,
                phone_number: "013800138000".to_string(),
                serial_number: 11,
                fragment: None,
            },
            body,
        }
    }

    fn location_body(status_sign: u32) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend_from_slice(&status_sign.to_be_bytes());
        body.extend_from_slice(&39_908_692u32.to_be_bytes()); // 39.908692°N
        body.extend_from_slice(&116_397_477u32.to_be_bytes()); // 116.397477°E
        body.extend_from_slice(&52u16.to_be_bytes());
        body.extend_from_slice(&635u16.to_be_bytes()); // 63.5 km/h
        body.extend_from_slice(&270u16.to_be_bytes());
        body.extend_from_slice(&[0x20, 0x07, 0x07, 0x19, 0x23, 0x59]);
        body
    }

    #[test]
    fn decode_and_convert_to_fix() {
        let status = STATUS_ACC_ON | STATUS_POSITIONED;
        let msg = Msg0200::decode(&packet(location_body(status))).expect("decode");
        assert_eq!(msg.time, "200707192359");

        let fix = msg.to_fix();
        assert!(fix.acc_on);
        assert!(fix.positioned);
        assert!((fix.latitude - 39.908692).abs() < 1e-9);
        assert!((fix.longitude - 116.397477).abs() < 1e-9);
        assert!((fix.speed_kmh - 63.5).abs() < 1e-9);
        assert_eq!(fix.direction, 270);
        assert_eq!(fix.altitude_m, 52);
    }

    #[test]
    fn acc_off_and_hemisphere_bits() {
        let status = STATUS_POSITIONED | STATUS_SOUTH_LATITUDE | STATUS_WEST_LONGITUDE;
        let fix = Msg0200::decode(&packet(location_body(status)))
            .expect("decode")
            .to_fix();
        assert!(!fix.acc_on);
        assert!(fix.latitude < 0.0);
        assert!(fix.longitude < 0.0);
    }

    #[test]
    fn extra_items_round_trip() {
        let mut body = location_body(STATUS_ACC_ON);
        body.extend_from_slice(&[0x01, 0x04, 0x00, 0x00, 0x01, 0x2c]); // 里程附加项
        let msg = Msg0200::decode(&packet(body.clone())).expect("decode");
        assert_eq!(msg.extra.len(), 6);
        assert_eq!(msg.encode_body().expect("encode"), body);
    }
}
