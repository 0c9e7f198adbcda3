//! 终端实体与生命周期状态。

use std::time::Duration;

use serde::Serialize;

use crate::session::{ConnectionHandle, TransportKind};

/// 终端生命周期状态。
///
/// 注册成功后为 `Offline`，鉴权通过转 `Online`，位置上报 ACC 关闭转
/// `Sleeping`；注销、鉴权失败或保活超时将记录整体移除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Offline,
    Online,
    Sleeping,
}

/// 已注册终端记录。
///
/// 所有权归注册中心：handler 读取的是快照，修改后通过重新 put 发布。
#[derive(Debug, Clone)]
pub struct Device {
    /// 终端 ID（ASCII，大写字母和数字）
    pub device_id: String,
    /// 车牌号（线上为 GBK 编码）
    pub plate_number: String,
    /// 终端手机号（BCD 解码后的十进制串），注册中心主键
    pub phone_number: String,
    /// 当前连接的会话 ID
    pub session_id: String,
    /// 承载协议
    pub transport: TransportKind,
    /// 当前连接的下行句柄
    pub conn: Option<ConnectionHandle>,
    /// 保活周期
    pub keepalive: Duration,
    /// 生命周期状态
    pub status: DeviceStatus,
    pub imei: Option<String>,
    pub software_version: Option<String>,
}
