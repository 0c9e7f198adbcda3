use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use jt808_codec::framing;
use jt808_codec::header::{MsgAttr, MsgHeader, ProtocolVersion};
use jt808_codec::message::{Msg0100, Msg8001, Msg8100, PacketData, msg_ids, results};
use jt808_protocol::{
    GatewayServer, KeepaliveTimer, MsgProcessor, ProcessorOptions, TcpServerConfig,
};
use jt808_storage::{DeviceStore, InMemoryDeviceStore, InMemoryGisStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const PHONE: &str = "013800138000";

fn header(msg_id: u16, body_len: usize) -> MsgHeader {
    MsgHeader {
        msg_id,
        attr: MsgAttr {
            body_length: body_len as u16,
            encryption: 0,
            fragmented: false,
            version_flag: false,
        },
        version: ProtocolVersion::V2013,
        protocol_version: None,
        phone_number: PHONE.to_string(),
        serial_number: 1,
        fragment: None,
    }
}

fn wire_frame(msg_id: u16, body: Vec<u8>) -> Vec<u8> {
    let mut payload = header(msg_id, body.len()).encode(body.len()).expect("header");
    payload.extend_from_slice(&body);
    framing::encode_frame(&payload)
}

fn register_body() -> Vec<u8> {
    let msg = Msg0100 {
        header: header(msg_ids::TERMINAL_REGISTER, 0),
        province_id: 0x002c,
        city_id: 0x0101,
        manufacturer_id: "ABCDE".to_string(),
        device_model: "MODEL-2013-VER-A".to_string(),
        device_id: "DEV0001".to_string(),
        plate_color: 1,
        plate_number: "京A12345".to_string(),
    };
    msg.encode_body().expect("register body")
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(1024);
    loop {
        if let Some(escaped) = framing::split_frame(&mut buf) {
            return framing::decode_frame(&escaped).expect("decode frame");
        }
        let n = timeout(Duration::from_secs(5), stream.read_buf(&mut buf))
            .await
            .expect("read timeout")
            .expect("read");
        assert!(n > 0, "connection closed before a full frame arrived");
    }
}

#[tokio::test]
async fn register_and_authenticate_over_tcp() {
    let devices = Arc::new(InMemoryDeviceStore::new());
    let gis = Arc::new(InMemoryGisStore::new(128));
    let keepalive = KeepaliveTimer::spawn(devices.clone());
    let processor = Arc::new(MsgProcessor::new(
        devices.clone(),
        gis,
        keepalive,
        ProcessorOptions::default(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = GatewayServer::new(
        TcpServerConfig {
            listen_addr: addr.to_string(),
        },
        processor,
    );
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    let mut stream = TcpStream::connect(addr).await.expect("connect");

    // 注册：期望 0x8100 成功并携带鉴权码
    stream
        .write_all(&wire_frame(msg_ids::TERMINAL_REGISTER, register_body()))
        .await
        .expect("send register");
    let payload = read_frame(&mut stream).await;
    let packet = PacketData::parse(&payload).expect("parse reply");
    assert_eq!(packet.header.msg_id, msg_ids::REGISTER_ACK);
    let ack = Msg8100::decode(&packet).expect("decode 8100");
    assert_eq!(ack.result, results::SUCCESS);
    assert!(!ack.auth_code.is_empty());

    // 鉴权：期望 0x8001 成功，终端转在线
    stream
        .write_all(&wire_frame(
            msg_ids::TERMINAL_AUTH,
            ack.auth_code.as_bytes().to_vec(),
        ))
        .await
        .expect("send auth");
    let payload = read_frame(&mut stream).await;
    let packet = PacketData::parse(&payload).expect("parse reply");
    assert_eq!(packet.header.msg_id, msg_ids::PLATFORM_GENERAL_ACK);
    let ack = Msg8001::decode(&packet).expect("decode 8001");
    assert_eq!(ack.result, results::SUCCESS);
    assert_eq!(ack.ack_msg_id, msg_ids::TERMINAL_AUTH);

    let device = devices.get_by_phone(PHONE).await.expect("device");
    assert_eq!(device.status, domain::DeviceStatus::Online);

    // 未注册的消息 ID 被忽略，连接保持可用
    stream
        .write_all(&wire_frame(0x0700, vec![0x00]))
        .await
        .expect("send unsupported");
    stream
        .write_all(&wire_frame(msg_ids::TERMINAL_HEARTBEAT, Vec::new()))
        .await
        .expect("send heartbeat");
    let payload = read_frame(&mut stream).await;
    let packet = PacketData::parse(&payload).expect("parse reply");
    let ack = Msg8001::decode(&packet).expect("decode 8001");
    assert_eq!(ack.ack_msg_id, msg_ids::TERMINAL_HEARTBEAT);
}
