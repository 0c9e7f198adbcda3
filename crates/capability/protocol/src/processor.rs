//! 消息处理器。
//!
//! 表驱动：每个消息 ID 对应一个处理项 {入站解码、应答构造}，
//! 调用表初始化后不再变更，可安全共享。处理流程：
//!
//! 1. 按消息 ID 取处理项，缺失即不支持；
//! 2. 解码入站载荷；
//! 3. 无应答构造项则到此结束（该消息无需回复）；
//! 4. 构造应答并回填应答字段（流水号、消息 ID、默认成功）；
//! 5. 执行消息语义：读写注册中心、定位缓存与保活定时器，
//!    handler 可改写应答结果码；
//! 6. 返回 `ProcessData`，由调用方编码发送。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use domain::{Device, DeviceStatus, Session};
use jt808_codec::CodecError;
use jt808_codec::hash;
use jt808_codec::message::{
    InboundMsg, Msg0001, Msg0002, Msg0003, Msg0100, Msg0102, Msg0200, Msg8001, Msg8100,
    OutboundMsg, PacketData, msg_ids, results,
};
use jt808_storage::{DeviceStore, GisStore, StorageError};
use serde::Serialize;
use tracing::{Level, debug, info, warn};

use crate::error::ProtocolError;
use crate::keepalive::KeepaliveTimer;

/// 处理器运行选项。
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// 新注册终端的初始保活周期
    pub keepalive_interval: Duration,
    /// 是否以 JSON 打印出入站载荷（仅 debug 级别生效）
    pub debug_payload_logging: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(60),
            debug_payload_logging: false,
        }
    }
}

/// 一次分发的瞬态数据：入站载荷与可选的应答载荷。
#[derive(Debug)]
pub struct ProcessData {
    pub incoming: InboundMsg,
    pub outgoing: Option<OutboundMsg>,
    /// 应答发出后调用方应关闭连接（鉴权失败）
    pub close_after_reply: bool,
}

type DecodeFn = fn(&PacketData) -> Result<InboundMsg, CodecError>;
type ReplyFn = fn(&InboundMsg) -> OutboundMsg;

/// 调用表表项：入站解码与可选的应答构造。
struct MsgAction {
    decode: DecodeFn,
    reply: Option<ReplyFn>,
}

fn decode_0001(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg0001::decode(packet).map(InboundMsg::GeneralAck)
}

fn decode_0002(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg0002::decode(packet).map(InboundMsg::Heartbeat)
}

fn decode_0003(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg0003::decode(packet).map(InboundMsg::Logout)
}

fn decode_0100(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg0100::decode(packet).map(InboundMsg::Register)
}

fn decode_0102(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg0102::decode(packet).map(InboundMsg::Authenticate)
}

fn decode_0200(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg0200::decode(packet).map(InboundMsg::LocationReport)
}

fn decode_8100(packet: &PacketData) -> Result<InboundMsg, CodecError> {
    Msg8100::decode(packet).map(InboundMsg::RegisterAck)
}

fn reply_8001(incoming: &InboundMsg) -> OutboundMsg {
    OutboundMsg::GeneralAck(Msg8001::reply_to(incoming.header()))
}

fn reply_8100(incoming: &InboundMsg) -> OutboundMsg {
    OutboundMsg::RegisterAck(Msg8100::reply_to(incoming.header()))
}

fn reply_0102(incoming: &InboundMsg) -> OutboundMsg {
    OutboundMsg::Authenticate(Msg0102::reply_to(incoming.header()))
}

/// 表驱动，初始化消息处理组。
fn init_actions() -> HashMap<u16, MsgAction> {
    let mut actions = HashMap::new();
    // 终端通用应答：无需回复
    actions.insert(
        msg_ids::TERMINAL_GENERAL_ACK,
        MsgAction {
            decode: decode_0001,
            reply: None,
        },
    );
    // 心跳
    actions.insert(
        msg_ids::TERMINAL_HEARTBEAT,
        MsgAction {
            decode: decode_0002,
            reply: Some(reply_8001),
        },
    );
    // 注销
    actions.insert(
        msg_ids::TERMINAL_LOGOUT,
        MsgAction {
            decode: decode_0003,
            reply: Some(reply_8001),
        },
    );
    // 注册
    actions.insert(
        msg_ids::TERMINAL_REGISTER,
        MsgAction {
            decode: decode_0100,
            reply: Some(reply_8100),
        },
    );
    // 鉴权
    actions.insert(
        msg_ids::TERMINAL_AUTH,
        MsgAction {
            decode: decode_0102,
            reply: Some(reply_8001),
        },
    );
    // 位置信息汇报
    actions.insert(
        msg_ids::LOCATION_REPORT,
        MsgAction {
            decode: decode_0200,
            reply: Some(reply_8001),
        },
    );
    // 注册应答（本网关作为 client 接入上级平台）
    actions.insert(
        msg_ids::REGISTER_ACK,
        MsgAction {
            decode: decode_8100,
            reply: Some(reply_0102),
        },
    );
    actions
}

/// 鉴权码：`device_id + "_" + plate + "_" + phone` 的 FNV-32 十进制串。
///
/// 弱哈希，仅用于标准兼容，不提供密码学强度。
pub fn gen_auth_code(device: &Device) -> String {
    let identity = format!(
        "{}_{}_{}",
        device.device_id, device.plate_number, device.phone_number
    );
    hash::fnv32(&identity).to_string()
}

/// JT/T 808 消息处理器。
pub struct MsgProcessor {
    actions: HashMap<u16, MsgAction>,
    devices: Arc<dyn DeviceStore>,
    gis: Arc<dyn GisStore>,
    keepalive: KeepaliveTimer,
    options: ProcessorOptions,
}

impl MsgProcessor {
    pub fn new(
        devices: Arc<dyn DeviceStore>,
        gis: Arc<dyn GisStore>,
        keepalive: KeepaliveTimer,
        options: ProcessorOptions,
    ) -> Self {
        Self {
            actions: init_actions(),
            devices,
            gis,
            keepalive,
            options,
        }
    }

    /// 处理一个报文，返回含可选应答的 `ProcessData`。
    pub async fn process(
        &self,
        session: &Session,
        packet: &PacketData,
    ) -> Result<ProcessData, ProtocolError> {
        let msg_id = packet.header.msg_id;
        let action = self
            .actions
            .get(&msg_id)
            .ok_or(ProtocolError::UnsupportedMessage(msg_id))?;

        let incoming =
            (action.decode)(packet).map_err(|source| ProtocolError::Decode { msg_id, source })?;
        self.log_payload(session, "incoming", &incoming);

        let outgoing = action.reply.map(|reply| reply(&incoming));
        let mut data = ProcessData {
            incoming,
            outgoing,
            close_after_reply: false,
        };
        self.dispatch(session, &mut data).await?;

        if let Some(outgoing) = &data.outgoing {
            self.log_payload(session, "outgoing", outgoing);
        }
        Ok(data)
    }

    async fn dispatch(
        &self,
        session: &Session,
        data: &mut ProcessData,
    ) -> Result<(), ProtocolError> {
        match data.incoming.msg_id() {
            msg_ids::TERMINAL_GENERAL_ACK => Ok(()),
            msg_ids::TERMINAL_HEARTBEAT => self.handle_heartbeat(data).await,
            msg_ids::TERMINAL_LOGOUT => self.handle_logout(data).await,
            msg_ids::TERMINAL_REGISTER => self.handle_register(session, data).await,
            msg_ids::TERMINAL_AUTH => self.handle_authenticate(data).await,
            msg_ids::LOCATION_REPORT => self.handle_location(data).await,
            msg_ids::REGISTER_ACK => self.handle_register_ack(data).await,
            other => Err(ProtocolError::UnsupportedMessage(other)),
        }
    }

    /// 收到心跳：重新写入终端记录并顺延保活。
    async fn handle_heartbeat(&self, data: &mut ProcessData) -> Result<(), ProtocolError> {
        let phone = data.incoming.header().phone_number.clone();
        let device = self.require_device(&phone).await?;
        self.devices.put(device).await?;
        self.keepalive.refresh(&phone);
        Ok(())
    }

    /// 收到注销：取消保活并清除终端记录。
    ///
    /// 连接不在这里关闭，等对端主动断开以避免 TIME_WAIT 堆积。
    async fn handle_logout(&self, data: &mut ProcessData) -> Result<(), ProtocolError> {
        let phone = data.incoming.header().phone_number.clone();
        self.require_device(&phone).await?;
        self.keepalive.cancel(&phone);
        self.devices.delete_by_phone(&phone).await?;
        jt808_telemetry::record_device_removed();
        info!(phone, "device logged out");
        Ok(())
    }

    /// 收到注册：校验车牌与手机号占用，可注册则建档并下发鉴权码。
    async fn handle_register(
        &self,
        session: &Session,
        data: &mut ProcessData,
    ) -> Result<(), ProtocolError> {
        let InboundMsg::Register(msg) = &data.incoming else {
            return Ok(());
        };
        let Some(OutboundMsg::RegisterAck(ack)) = data.outgoing.as_mut() else {
            return Ok(());
        };
        let phone = msg.header.phone_number.clone();

        // 车辆已被注册
        if self.devices.has_plate(&msg.plate_number).await? {
            ack.result = results::CAR_ALREADY_REGISTERED;
            warn!(phone, plate = %msg.plate_number, "plate already registered");
            return Ok(());
        }
        // 终端已被注册
        if self.devices.has_phone(&phone).await? {
            ack.result = results::DEVICE_ALREADY_REGISTERED;
            warn!(phone, "phone already registered");
            return Ok(());
        }

        let device = Device {
            device_id: msg.device_id.clone(),
            plate_number: msg.plate_number.clone(),
            phone_number: phone.clone(),
            session_id: session.id.clone(),
            transport: session.transport,
            conn: Some(session.conn.clone()),
            keepalive: self.options.keepalive_interval,
            status: DeviceStatus::Offline,
            imei: None,
            software_version: None,
        };
        ack.auth_code = gen_auth_code(&device);
        self.devices.put(device).await?;
        self.keepalive
            .register(&phone, self.options.keepalive_interval);
        jt808_telemetry::record_device_registered();
        info!(phone, plate = %msg.plate_number, "device registered");
        Ok(())
    }

    /// 收到鉴权：校验鉴权码。不匹配即回失败、清档并要求断开；
    /// 匹配则转在线。
    async fn handle_authenticate(&self, data: &mut ProcessData) -> Result<(), ProtocolError> {
        let InboundMsg::Authenticate(msg) = &data.incoming else {
            return Ok(());
        };
        let phone = msg.header.phone_number.clone();
        let mut device = self.require_device(&phone).await?;

        if msg.auth_code != gen_auth_code(&device) {
            if let Some(OutboundMsg::GeneralAck(ack)) = data.outgoing.as_mut() {
                ack.result = results::FAILURE;
            }
            self.keepalive.cancel(&phone);
            self.devices.delete_by_phone(&phone).await?;
            jt808_telemetry::record_device_removed();
            data.close_after_reply = true;
            warn!(phone, "auth code mismatch, device removed");
            return Ok(());
        }

        device.status = DeviceStatus::Online;
        // 2019 版鉴权随带 IMEI 与软件版本，一并存档
        if let Some(imei) = msg.imei.as_deref().filter(|s| !s.is_empty()) {
            device.imei = Some(imei.to_string());
        }
        if let Some(version) = msg.software_version.as_deref().filter(|s| !s.is_empty()) {
            device.software_version = Some(version.to_string());
        }
        self.devices.put(device).await?;
        self.keepalive.refresh(&phone);
        info!(phone, "device authenticated");
        Ok(())
    }

    /// 收到位置上报：ACC 关闭则转休眠，定位记录写入环形缓存。
    async fn handle_location(&self, data: &mut ProcessData) -> Result<(), ProtocolError> {
        let InboundMsg::LocationReport(msg) = &data.incoming else {
            return Ok(());
        };
        let phone = msg.header.phone_number.clone();
        let mut device = self.require_device(&phone).await?;

        let fix = msg.to_fix();
        if !fix.acc_on {
            device.status = DeviceStatus::Sleeping;
            self.devices.put(device).await?;
            self.keepalive.refresh(&phone);
        }
        self.gis.write_fix(&phone, fix).await?;
        Ok(())
    }

    /// client 侧收到注册应答：以本地档案重算鉴权码，回 0x0102。
    async fn handle_register_ack(&self, data: &mut ProcessData) -> Result<(), ProtocolError> {
        let InboundMsg::RegisterAck(msg) = &data.incoming else {
            return Ok(());
        };
        let phone = msg.header.phone_number.clone();
        let device = match self.devices.get_by_phone(&phone).await {
            Ok(device) => device,
            Err(StorageError::DeviceNotFound(phone)) => {
                return Err(ProtocolError::ActiveClose(phone));
            }
            Err(err) => return Err(err.into()),
        };
        let Some(OutboundMsg::Authenticate(auth)) = data.outgoing.as_mut() else {
            return Ok(());
        };
        auth.auth_code = gen_auth_code(&device);
        auth.imei = device.imei.clone();
        auth.software_version = device.software_version.clone();
        Ok(())
    }

    async fn require_device(&self, phone: &str) -> Result<Device, ProtocolError> {
        match self.devices.get_by_phone(phone).await {
            Ok(device) => Ok(device),
            Err(StorageError::DeviceNotFound(phone)) => Err(ProtocolError::DeviceNotFound(phone)),
            Err(err) => Err(err.into()),
        }
    }

    fn log_payload<T: Serialize>(&self, session: &Session, direction: &str, payload: &T) {
        if !self.options.debug_payload_logging || !tracing::enabled!(Level::DEBUG) {
            return;
        }
        match serde_json::to_string(payload) {
            Ok(json) => {
                debug!(session = %session.id, direction, payload = %json, "jt808 msg")
            }
            Err(err) => warn!(session = %session.id, error = %err, "payload log failed"),
        }
    }
}
