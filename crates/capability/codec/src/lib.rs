//! # JT/T 808 编解码模块
//!
//! 提供 JT/T 808（2011/2013/2019 版）报文的编解码能力：
//! - **字段层** (`frame`)：带游标的大端字段读写（byte/word/dword/BCD/定长串/GBK 串）
//! - **组帧层** (`framing`)：`7E … 7E` 定界、`7D 01`/`7D 02` 转义与 XOR 校验
//! - **消息头** (`header`)：属性字、版本标识、手机号 BCD、流水号与分包字段
//! - **消息体** (`message`)：各消息 ID 的类型化载荷与出入站枚举
//! - **哈希** (`hash`)：鉴权码使用的 FNV-32
//!
//! ## 帧结构
//!
//! ```text
//! 7E | header | body | checksum(1) | 7E
//!      └── checksum = header..body 逐字节 XOR，转义发生在校验之后
//! ```

pub mod error;
pub mod frame;
pub mod framing;
pub mod hash;
pub mod header;
pub mod message;

pub use error::CodecError;
pub use frame::{FieldReader, FieldWriter};
pub use header::{Fragment, MsgAttr, MsgHeader, ProtocolVersion};
pub use message::*;
