//! 保活定时器。
//!
//! 单个监督任务维护所有终端的到期时间：命令通道接收注册/刷新/取消，
//! 最小堆按到期排序。刷新与取消不从堆里删除旧条目，而是提升代次号
//! 使其失效（墓碑），弹出时校验代次即可。

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use jt808_storage::DeviceStore;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{info, warn};

enum Command {
    Register { phone: String, interval: Duration },
    Refresh { phone: String },
    Cancel { phone: String },
}

/// 保活定时器句柄；clone 共享同一监督任务。
#[derive(Clone)]
pub struct KeepaliveTimer {
    tx: mpsc::UnboundedSender<Command>,
}

impl KeepaliveTimer {
    /// 启动监督任务。到期未刷新的终端将从注册中心移除。
    pub fn spawn(devices: Arc<dyn DeviceStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_supervisor(rx, devices));
        Self { tx }
    }

    /// 登记（或重置）终端的保活周期。
    pub fn register(&self, phone: &str, interval: Duration) {
        self.send(Command::Register {
            phone: phone.to_string(),
            interval,
        });
    }

    /// 以原有周期顺延到期时间；未登记的手机号忽略。
    pub fn refresh(&self, phone: &str) {
        self.send(Command::Refresh {
            phone: phone.to_string(),
        });
    }

    /// 取消终端保活；幂等。
    pub fn cancel(&self, phone: &str) {
        self.send(Command::Cancel {
            phone: phone.to_string(),
        });
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("keepalive supervisor is gone");
        }
    }
}

struct Entry {
    deadline: Instant,
    generation: u64,
    interval: Duration,
}

async fn run_supervisor(mut rx: mpsc::UnboundedReceiver<Command>, devices: Arc<dyn DeviceStore>) {
    let mut entries: HashMap<String, Entry> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<(Instant, u64, String)>> = BinaryHeap::new();
    let mut next_generation: u64 = 0;

    loop {
        let next_deadline = heap.peek().map(|Reverse((at, _, _))| *at);
        tokio::select! {
            // 先排空命令再判到期：同时到达的刷新优先于过期处理
            biased;
            command = rx.recv() => match command {
                Some(Command::Register { phone, interval }) => {
                    next_generation += 1;
                    let deadline = Instant::now() + interval;
                    entries.insert(
                        phone.clone(),
                        Entry { deadline, generation: next_generation, interval },
                    );
                    heap.push(Reverse((deadline, next_generation, phone)));
                }
                Some(Command::Refresh { phone }) => {
                    if let Some(entry) = entries.get_mut(&phone) {
                        next_generation += 1;
                        entry.generation = next_generation;
                        entry.deadline = Instant::now() + entry.interval;
                        heap.push(Reverse((entry.deadline, next_generation, phone)));
                    }
                }
                Some(Command::Cancel { phone }) => {
                    entries.remove(&phone);
                }
                None => break, // 所有句柄已丢弃
            },
            _ = sleep_until(next_deadline.unwrap_or_else(Instant::now)), if next_deadline.is_some() => {
                let Some(Reverse((_, generation, phone))) = heap.pop() else {
                    continue;
                };
                let live = entries
                    .get(&phone)
                    .is_some_and(|entry| entry.generation == generation);
                if !live {
                    continue; // 墓碑：已刷新或已取消
                }
                entries.remove(&phone);
                expire(&devices, &phone).await;
            }
        }
    }
}

async fn expire(devices: &Arc<dyn DeviceStore>, phone: &str) {
    match devices.delete_by_phone(phone).await {
        Ok(()) => {
            info!(phone, "keepalive expired, device removed");
            jt808_telemetry::record_keepalive_timeout();
            jt808_telemetry::record_device_removed();
        }
        Err(err) => warn!(phone, error = %err, "keepalive expiry cleanup failed"),
    }
}
