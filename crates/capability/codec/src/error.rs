//! 编解码错误类型定义

/// 报文编解码错误。
///
/// 解码侧任何错误都使当前报文作废，由调用方丢弃该帧。
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// 读取越界：报文在期望的字段结束前耗尽
    #[error("short read: need {need} bytes, {remaining} remaining")]
    ShortRead { need: usize, remaining: usize },

    /// BCD 字段出现非十进制半字节
    #[error("invalid bcd nibble {0:#x}")]
    InvalidBcd(u8),

    /// BCD 写入值不是纯数字或超出字段宽度
    #[error("value {0:?} not encodable as {1}-byte bcd")]
    BcdOverflow(String, usize),

    /// 定长字段装不下给定值
    #[error("fixed field overflow: value takes {len} bytes, field is {width}")]
    FieldOverflow { len: usize, width: usize },

    /// 帧未以 0x7e 正确定界
    #[error("frame not delimited by 0x7e")]
    BadDelimiter,

    /// 0x7d 之后出现未定义的转义字节
    #[error("bad escape sequence 0x7d {0:#04x}")]
    BadEscape(u8),

    /// 校验和不匹配
    #[error("checksum mismatch: frame carries {carried:#04x}, computed {computed:#04x}")]
    ChecksumMismatch { carried: u8, computed: u8 },

    /// 消息头声明的体长度与实际不符
    #[error("header declares body length {declared}, actual {actual}")]
    BodyLengthMismatch { declared: usize, actual: usize },

    /// 消息体超出属性字 10 位长度域的上限
    #[error("body length {0} exceeds 10-bit attribute field")]
    BodyTooLong(usize),
}
