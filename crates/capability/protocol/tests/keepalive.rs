use std::sync::Arc;
use std::time::Duration;

use domain::{Device, DeviceStatus, TransportKind};
use jt808_protocol::KeepaliveTimer;
use jt808_storage::{DeviceStore, InMemoryDeviceStore};
use tokio::time::sleep;

const PHONE: &str = "013800138000";

fn device(phone: &str) -> Device {
    Device {
        device_id: "DEV0001".to_string(),
        plate_number: "京A12345".to_string(),
        phone_number: phone.to_string(),
        session_id: "session-1".to_string(),
        transport: TransportKind::Tcp,
        conn: None,
        keepalive: Duration::from_millis(100),
        status: DeviceStatus::Offline,
        imei: None,
        software_version: None,
    }
}

#[tokio::test]
async fn lapsed_deadline_removes_device() {
    let devices = Arc::new(InMemoryDeviceStore::new());
    devices.put(device(PHONE)).await.expect("put");
    let timer = KeepaliveTimer::spawn(devices.clone());

    timer.register(PHONE, Duration::from_millis(100));
    sleep(Duration::from_millis(300)).await;
    assert!(!devices.has_phone(PHONE).await.expect("phone"));
}

#[tokio::test]
async fn refresh_extends_the_deadline() {
    let devices = Arc::new(InMemoryDeviceStore::new());
    devices.put(device(PHONE)).await.expect("put");
    let timer = KeepaliveTimer::spawn(devices.clone());

    timer.register(PHONE, Duration::from_millis(200));
    sleep(Duration::from_millis(120)).await;
    timer.refresh(PHONE);
    sleep(Duration::from_millis(120)).await;
    assert!(
        devices.has_phone(PHONE).await.expect("phone"),
        "refresh must outlive the original deadline"
    );
    sleep(Duration::from_millis(400)).await;
    assert!(!devices.has_phone(PHONE).await.expect("phone"));
}

#[tokio::test]
async fn cancel_is_idempotent_and_stops_expiry() {
    let devices = Arc::new(InMemoryDeviceStore::new());
    devices.put(device(PHONE)).await.expect("put");
    let timer = KeepaliveTimer::spawn(devices.clone());

    timer.register(PHONE, Duration::from_millis(100));
    timer.cancel(PHONE);
    timer.cancel(PHONE); // 重复取消无害
    sleep(Duration::from_millis(300)).await;
    assert!(devices.has_phone(PHONE).await.expect("phone"));
}

#[tokio::test]
async fn refresh_of_unknown_phone_is_ignored() {
    let devices = Arc::new(InMemoryDeviceStore::new());
    let timer = KeepaliveTimer::spawn(devices.clone());
    timer.refresh("013999999999");
    sleep(Duration::from_millis(50)).await;
    // 监督任务未崩溃即可继续服务
    devices.put(device(PHONE)).await.expect("put");
    timer.register(PHONE, Duration::from_millis(50));
    sleep(Duration::from_millis(200)).await;
    assert!(!devices.has_phone(PHONE).await.expect("phone"));
}

#[tokio::test]
async fn re_register_resets_the_interval() {
    let devices = Arc::new(InMemoryDeviceStore::new());
    devices.put(device(PHONE)).await.expect("put");
    let timer = KeepaliveTimer::spawn(devices.clone());

    timer.register(PHONE, Duration::from_millis(100));
    timer.register(PHONE, Duration::from_millis(500));
    sleep(Duration::from_millis(250)).await;
    assert!(
        devices.has_phone(PHONE).await.expect("phone"),
        "second register must supersede the first deadline"
    );
}
