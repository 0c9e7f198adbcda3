//! 组帧层：定界、转义与校验。
//!
//! 线上帧为 `7E <转义后字节> 7E`；载荷内 `0x7e` 转义为 `7D 02`，
//! `0x7d` 转义为 `7D 01`。转义前的载荷为 `header || body || checksum`，
//! 校验字节是其余字节的逐位 XOR。

use bytes::{Buf, Bytes, BytesMut};

use crate::error::CodecError;

const FRAME_DELIMITER: u8 = 0x7e;
const ESCAPE_MARK: u8 = 0x7d;
const ESCAPE_FOR_MARK: u8 = 0x01;
const ESCAPE_FOR_DELIMITER: u8 = 0x02;

/// 从累积缓冲中切出一个完整帧（去掉两侧 0x7e，仍为转义态）。
///
/// 首个 0x7e 之前的字节按噪声丢弃；没有完整帧时返回 `None` 并保留
/// 已有数据等待下次读取。相邻帧共享定界符时产生的空帧会被跳过。
pub fn split_frame(buf: &mut BytesMut) -> Option<Bytes> {
    loop {
        let start = buf.iter().position(|b| *b == FRAME_DELIMITER)?;
        if start > 0 {
            buf.advance(start);
        }
        let end = buf[1..].iter().position(|b| *b == FRAME_DELIMITER)?;
        if end == 0 {
            // 空帧：连续两个定界符，丢弃前一个
            buf.advance(1);
            continue;
        }
        // 尾定界符留在缓冲里，兼容相邻帧共享定界符的设备
        let mut frame = buf.split_to(end + 1);
        frame.advance(1);
        return Some(frame.freeze());
    }
}

/// 反转义并校验，返回 `header || body`（不含校验字节）。
pub fn decode_frame(escaped: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut payload = Vec::with_capacity(escaped.len());
    let mut iter = escaped.iter();
    while let Some(&b) = iter.next() {
        match b {
            ESCAPE_MARK => match iter.next() {
                Some(&ESCAPE_FOR_MARK) => payload.push(ESCAPE_MARK),
                Some(&ESCAPE_FOR_DELIMITER) => payload.push(FRAME_DELIMITER),
                Some(&other) => return Err(CodecError::BadEscape(other)),
                None => return Err(CodecError::BadEscape(0x00)),
            },
            FRAME_DELIMITER => return Err(CodecError::BadDelimiter),
            _ => payload.push(b),
        }
    }
    let carried = payload.pop().ok_or(CodecError::BadDelimiter)?;
    let computed = xor_checksum(&payload);
    if carried != computed {
        return Err(CodecError::ChecksumMismatch { carried, computed });
    }
    Ok(payload)
}

/// 为 `header || body` 追加校验、转义并加上定界符，产出线上帧。
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let checksum = xor_checksum(payload);
    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.push(FRAME_DELIMITER);
    for &b in payload.iter().chain(std::iter::once(&checksum)) {
        match b {
            FRAME_DELIMITER => frame.extend_from_slice(&[ESCAPE_MARK, ESCAPE_FOR_DELIMITER]),
            ESCAPE_MARK => frame.extend_from_slice(&[ESCAPE_MARK, ESCAPE_FOR_MARK]),
            _ => frame.push(b),
        }
    }
    frame.push(FRAME_DELIMITER);
    frame
}

fn xor_checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0, |acc, b| acc ^ b)
}
