//! 消息头编解码。
//!
//! 属性字布局：体长度 bit 0-9，加密方式 bit 10-12，分包 bit 13，
//! 版本标识 bit 14，保留 bit 15。版本标识置位即 2019 版，头部多出
//! 1 字节协议版本号且手机号扩展为 10 字节 BCD；未置位按 2013 版解，
//! 2011 版由 0x0100 消息体的长度启发式回写（见 `message::Msg0100`）。

use serde::Serialize;

use crate::error::CodecError;
use crate::frame::{FieldReader, FieldWriter};

const BODY_LENGTH_MASK: u16 = 0x03ff;
const ENCRYPTION_SHIFT: u16 = 10;
const ENCRYPTION_MASK: u16 = 0x07;
const FRAGMENTED_BIT: u16 = 1 << 13;
const VERSION_FLAG_BIT: u16 = 1 << 14;

/// 协议版本。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProtocolVersion {
    V2011,
    V2013,
    V2019,
}

/// 消息体属性字。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MsgAttr {
    pub body_length: u16,
    pub encryption: u8,
    pub fragmented: bool,
    pub version_flag: bool,
}

impl MsgAttr {
    pub fn from_raw(raw: u16) -> Self {
        Self {
            body_length: raw & BODY_LENGTH_MASK,
            encryption: ((raw >> ENCRYPTION_SHIFT) & ENCRYPTION_MASK) as u8,
            fragmented: raw & FRAGMENTED_BIT != 0,
            version_flag: raw & VERSION_FLAG_BIT != 0,
        }
    }

    pub fn to_raw(self) -> u16 {
        let mut raw = self.body_length & BODY_LENGTH_MASK;
        raw |= (u16::from(self.encryption) & ENCRYPTION_MASK) << ENCRYPTION_SHIFT;
        if self.fragmented {
            raw |= FRAGMENTED_BIT;
        }
        if self.version_flag {
            raw |= VERSION_FLAG_BIT;
        }
        raw
    }
}

/// 分包信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub total: u16,
    pub index: u16,
}

/// JT/T 808 消息头。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MsgHeader {
    pub msg_id: u16,
    pub attr: MsgAttr,
    pub version: ProtocolVersion,
    /// 2019 版头部携带的协议版本号原文
    pub protocol_version: Option<u8>,
    /// BCD 解码后的终端手机号
    pub phone_number: String,
    pub serial_number: u16,
    pub fragment: Option<Fragment>,
}

impl MsgHeader {
    /// 解析消息头，返回头部与消息体的起始偏移。
    pub fn decode(payload: &[u8]) -> Result<(Self, usize), CodecError> {
        let mut r = FieldReader::new(payload);
        let msg_id = r.read_u16()?;
        let attr = MsgAttr::from_raw(r.read_u16()?);

        let (version, protocol_version, phone_number) = if attr.version_flag {
            let pv = r.read_u8()?;
            (ProtocolVersion::V2019, Some(pv), r.read_bcd(10)?)
        } else {
            (ProtocolVersion::V2013, None, r.read_bcd(6)?)
        };

        let serial_number = r.read_u16()?;
        let fragment = if attr.fragmented {
            Some(Fragment {
                total: r.read_u16()?,
                index: r.read_u16()?,
            })
        } else {
            None
        };

        let header = Self {
            msg_id,
            attr,
            version,
            protocol_version,
            phone_number,
            serial_number,
            fragment,
        };
        Ok((header, r.pos()))
    }

    /// 编码消息头；体长度按给定的 `body_len` 回填属性字。
    pub fn encode(&self, body_len: usize) -> Result<Vec<u8>, CodecError> {
        if body_len > usize::from(BODY_LENGTH_MASK) {
            return Err(CodecError::BodyTooLong(body_len));
        }
        let attr = MsgAttr {
            body_length: body_len as u16,
            version_flag: self.version == ProtocolVersion::V2019,
            fragmented: self.fragment.is_some(),
            ..self.attr
        };

        let mut w = FieldWriter::new();
        w.write_u16(self.msg_id);
        w.write_u16(attr.to_raw());
        if attr.version_flag {
            w.write_u8(self.protocol_version.unwrap_or(1));
            w.write_bcd(&self.phone_number, 10)?;
        } else {
            w.write_bcd(&self.phone_number, 6)?;
        }
        w.write_u16(self.serial_number);
        if let Some(fragment) = self.fragment {
            w.write_u16(fragment.total);
            w.write_u16(fragment.index);
        }
        Ok(w.into_inner())
    }

    /// 以本消息头为模板构造应答头：同一手机号与流水号，消息 ID 替换，
    /// 不继承分包属性。
    pub fn reply(&self, msg_id: u16) -> Self {
        Self {
            msg_id,
            attr: MsgAttr {
                fragmented: false,
                ..self.attr
            },
            version: self.version,
            protocol_version: self.protocol_version,
            phone_number: self.phone_number.clone(),
            serial_number: self.serial_number,
            fragment: None,
        }
    }
}
