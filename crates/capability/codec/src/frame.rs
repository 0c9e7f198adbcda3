//! 带游标的字段读写。
//!
//! 数值一律大端；定长字符串右侧补 `0x00`，读取时去除尾部补齐。

use encoding_rs::GBK;

use crate::error::CodecError;

/// 顺序读取器：持有报文切片与显式游标。
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// 当前游标位置。
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// 尚未读取的字节数。
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::ShortRead {
                need: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// 读取 `n` 字节 BCD，返回十进制串（保留前导零）。
    pub fn read_bcd(&mut self, n: usize) -> Result<String, CodecError> {
        let bytes = self.take(n)?;
        let mut out = String::with_capacity(n * 2);
        for b in bytes {
            for nibble in [b >> 4, b & 0x0f] {
                if nibble > 9 {
                    return Err(CodecError::InvalidBcd(nibble));
                }
                out.push(char::from(b'0' + nibble));
            }
        }
        Ok(out)
    }

    /// 读取 `n` 字节 ASCII 定长串，去除尾部 NUL 补齐。
    pub fn read_string(&mut self, n: usize) -> Result<String, CodecError> {
        let bytes = self.take(n)?;
        Ok(String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .to_string())
    }

    /// 读取 `n` 字节 GBK 串并解码为 UTF-8。
    pub fn read_gbk(&mut self, n: usize) -> Result<String, CodecError> {
        let bytes = self.take(n)?;
        let (decoded, _, _) = GBK.decode(bytes);
        Ok(decoded.trim_end_matches('\0').to_string())
    }

    /// 取走剩余全部字节。
    pub fn read_rest(&mut self) -> &'a [u8] {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice
    }
}

/// 顺序写入器：向自有缓冲追加字段。
#[derive(Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 写入 `width` 字节 BCD；数字串不足时左侧补零。
    pub fn write_bcd(&mut self, value: &str, width: usize) -> Result<(), CodecError> {
        if value.len() > width * 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::BcdOverflow(value.to_string(), width));
        }
        let padded = format!("{value:0>width$}", width = width * 2);
        let digits = padded.as_bytes();
        for pair in digits.chunks(2) {
            self.buf.push(((pair[0] - b'0') << 4) | (pair[1] - b'0'));
        }
        Ok(())
    }

    /// 写入 `width` 字节 ASCII 定长串，右侧补 NUL。
    pub fn write_string(&mut self, value: &str, width: usize) -> Result<(), CodecError> {
        let bytes = value.as_bytes();
        if bytes.len() > width {
            return Err(CodecError::FieldOverflow {
                len: bytes.len(),
                width,
            });
        }
        self.buf.extend_from_slice(bytes);
        self.buf.extend(std::iter::repeat_n(0u8, width - bytes.len()));
        Ok(())
    }

    /// 以 GBK 编码写入变长串（不补齐）。
    pub fn write_gbk(&mut self, value: &str) {
        let (encoded, _, _) = GBK.encode(value);
        self.buf.extend_from_slice(&encoded);
    }
}
