//! 终端注册中心内存实现
//!
//! 使用 RwLock + HashMap 提供线程安全的内存存储：
//! - `devices`：手机号 → 终端记录
//! - `plates`：车牌号 → 手机号 二级索引
//!
//! 两张表只在 `put` / `delete_by_phone` 内一并修改，保证活跃记录上
//! 手机号与车牌号互为双射。

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use domain::Device;

use crate::error::StorageError;
use crate::traits::DeviceStore;

/// 终端注册中心内存存储。
pub struct InMemoryDeviceStore {
    devices: RwLock<HashMap<String, Device>>,
    plates: RwLock<HashMap<String, String>>,
}

impl InMemoryDeviceStore {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            plates: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn get_by_phone(&self, phone: &str) -> Result<Device, StorageError> {
        let devices = self.devices.read().map_err(|_| StorageError::Lock)?;
        devices
            .get(phone)
            .cloned()
            .ok_or_else(|| StorageError::DeviceNotFound(phone.to_string()))
    }

    async fn has_phone(&self, phone: &str) -> Result<bool, StorageError> {
        let devices = self.devices.read().map_err(|_| StorageError::Lock)?;
        Ok(devices.contains_key(phone))
    }

    async fn has_plate(&self, plate: &str) -> Result<bool, StorageError> {
        let plates = self.plates.read().map_err(|_| StorageError::Lock)?;
        Ok(plates.contains_key(plate))
    }

    async fn put(&self, device: Device) -> Result<(), StorageError> {
        let mut devices = self.devices.write().map_err(|_| StorageError::Lock)?;
        let mut plates = self.plates.write().map_err(|_| StorageError::Lock)?;
        if let Some(old) = devices.get(&device.phone_number)
            && old.plate_number != device.plate_number
        {
            plates.remove(&old.plate_number);
        }
        plates.insert(device.plate_number.clone(), device.phone_number.clone());
        devices.insert(device.phone_number.clone(), device);
        Ok(())
    }

    async fn delete_by_phone(&self, phone: &str) -> Result<(), StorageError> {
        let mut devices = self.devices.write().map_err(|_| StorageError::Lock)?;
        let mut plates = self.plates.write().map_err(|_| StorageError::Lock)?;
        if let Some(old) = devices.remove(phone) {
            plates.remove(&old.plate_number);
        }
        Ok(())
    }

    async fn len(&self) -> Result<usize, StorageError> {
        let devices = self.devices.read().map_err(|_| StorageError::Lock)?;
        Ok(devices.len())
    }
}
