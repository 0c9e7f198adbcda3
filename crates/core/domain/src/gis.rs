//! 定位记录。

use serde::Serialize;

/// 一条已解码的定位记录，写入终端的定位环形缓存。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GisFix {
    /// 纬度（度，南纬为负）
    pub latitude: f64,
    /// 经度（度，西经为负）
    pub longitude: f64,
    /// 速度（km/h）
    pub speed_kmh: f64,
    /// 方向（0-359，正北为 0）
    pub direction: u16,
    /// 海拔（米）
    pub altitude_m: u16,
    /// 定位时间（BCD 原文，YYMMDDhhmmss）
    pub time: String,
    /// 状态位原文
    pub status_sign: u32,
    /// ACC 开关（状态位 bit 0）
    pub acc_on: bool,
    /// 是否已定位（状态位 bit 1）
    pub positioned: bool,
}
