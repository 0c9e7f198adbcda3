//! TCP 服务器实现
//!
//! 监听 TCP 端口，逐连接启动读任务：累积字节、按 0x7e 切帧、
//! 反转义校验后交消息处理器，应答经每连接的下行通道由独立写任务
//! 发出。错误处置遵循处理器的错误种类约定。

use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use domain::{Session, TransportKind};
use jt808_codec::framing;
use jt808_codec::message::PacketData;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ProtocolError;
use crate::processor::MsgProcessor;

const READ_BUFFER_CAPACITY: usize = 4096;

/// 连接收尾时等待写任务排空的上限。
///
/// 注册中心里的终端记录持有下行通道的克隆，通道不会随会话释放而
/// 立即关闭，排空只能限时等待。
const WRITE_DRAIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// TCP 服务器配置
#[derive(Debug, Clone)]
pub struct TcpServerConfig {
    /// 监听地址
    pub listen_addr: String,
}

/// 帧处理后的连接处置。
enum Disposition {
    Continue,
    Close,
}

/// JT/T 808 TCP 服务器。
pub struct GatewayServer {
    config: TcpServerConfig,
    processor: Arc<MsgProcessor>,
}

impl GatewayServer {
    pub fn new(config: TcpServerConfig, processor: Arc<MsgProcessor>) -> Self {
        Self { config, processor }
    }

    /// 绑定监听地址并运行服务器。
    pub async fn run(&self) -> io::Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        info!("jt808 tcp server listening on {}", self.config.listen_addr);
        self.serve(listener).await
    }

    /// 在给定的 listener 上运行接入循环。
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    info!("new connection from {}", peer_addr);
                    let processor = Arc::clone(&self.processor);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, processor).await {
                            warn!("connection error from {}: {}", peer_addr, err);
                        }
                    });
                }
                Err(err) => {
                    error!("failed to accept connection: {}", err);
                }
            }
        }
    }
}

/// 处理单个连接。
async fn handle_connection(stream: TcpStream, processor: Arc<MsgProcessor>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let session = Session {
        id: Uuid::new_v4().to_string(),
        transport: TransportKind::Tcp,
        conn: tx,
    };

    // 下行独占写任务：通道排空后退出
    let mut write_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if writer.write_all(&frame).await.is_err() {
                break;
            }
        }
    });

    let result = read_loop(reader, &processor, &session).await;

    // 注销等场景下等对端先断开；收尾时限时排空下行通道
    drop(session);
    if tokio::time::timeout(WRITE_DRAIN_TIMEOUT, &mut write_task)
        .await
        .is_err()
    {
        write_task.abort();
    }
    result
}

async fn read_loop(
    mut reader: OwnedReadHalf,
    processor: &MsgProcessor,
    session: &Session,
) -> io::Result<()> {
    let mut buf = BytesMut::with_capacity(READ_BUFFER_CAPACITY);
    loop {
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            debug!(session = %session.id, "connection closed by peer");
            return Ok(());
        }
        while let Some(escaped) = framing::split_frame(&mut buf) {
            if let Disposition::Close = process_frame(processor, session, &escaped).await {
                return Ok(());
            }
        }
    }
}

/// 处理一帧：解帧、分发、回帧，返回连接处置。
async fn process_frame(
    processor: &MsgProcessor,
    session: &Session,
    escaped: &[u8],
) -> Disposition {
    jt808_telemetry::record_frame_received();

    let packet = match framing::decode_frame(escaped).and_then(|payload| PacketData::parse(&payload))
    {
        Ok(packet) => packet,
        Err(err) => {
            jt808_telemetry::record_decode_failure();
            warn!(session = %session.id, error = %err, "dropping malformed frame");
            return Disposition::Continue;
        }
    };

    match processor.process(session, &packet).await {
        Ok(data) => {
            if let Some(outgoing) = &data.outgoing {
                match outgoing.encode() {
                    Ok(payload) => {
                        if session.conn.send(framing::encode_frame(&payload)).is_ok() {
                            jt808_telemetry::record_frame_sent();
                        }
                    }
                    Err(source) => {
                        let err = ProtocolError::Encode {
                            msg_id: outgoing.msg_id(),
                            source,
                        };
                        warn!(session = %session.id, error = %err, "dropping reply");
                    }
                }
            }
            if data.close_after_reply {
                Disposition::Close
            } else {
                Disposition::Continue
            }
        }
        Err(ProtocolError::UnsupportedMessage(msg_id)) => {
            jt808_telemetry::record_unsupported_message();
            debug!(session = %session.id, msg_id, "ignoring unsupported message");
            Disposition::Continue
        }
        Err(err @ ProtocolError::Decode { .. }) => {
            jt808_telemetry::record_decode_failure();
            warn!(session = %session.id, error = %err, "dropping undecodable frame");
            Disposition::Continue
        }
        Err(err @ (ProtocolError::DeviceNotFound(_) | ProtocolError::ActiveClose(_))) => {
            warn!(session = %session.id, error = %err, "closing connection");
            Disposition::Close
        }
        Err(err) => {
            error!(session = %session.id, error = %err, "processing failed, closing connection");
            Disposition::Close
        }
    }
}
