//! 存储接口 Trait 定义
//!
//! 设计原则：
//! - handler 只依赖 Trait，不感知具体实现
//! - 使用 async_trait 支持动态分发

use async_trait::async_trait;
use domain::{Device, GisFix};

use crate::error::StorageError;

/// 终端注册中心接口。
///
/// 手机号是主键；车牌号索引由实现维护，调用方不直接操作。
#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// 按手机号取终端快照
    async fn get_by_phone(&self, phone: &str) -> Result<Device, StorageError>;

    /// 手机号是否已注册
    async fn has_phone(&self, phone: &str) -> Result<bool, StorageError>;

    /// 车牌号是否已注册
    async fn has_plate(&self, plate: &str) -> Result<bool, StorageError>;

    /// 写入终端记录：覆盖同手机号旧记录并维护车牌索引，幂等
    async fn put(&self, device: Device) -> Result<(), StorageError>;

    /// 按手机号删除终端及其车牌索引；不存在时静默返回
    async fn delete_by_phone(&self, phone: &str) -> Result<(), StorageError>;

    /// 当前记录数
    async fn len(&self) -> Result<usize, StorageError>;
}

/// 定位环形缓存接口。
#[async_trait]
pub trait GisStore: Send + Sync {
    /// 追加一条定位记录，满时覆盖最旧一条
    async fn write_fix(&self, phone: &str, fix: GisFix) -> Result<(), StorageError>;

    /// 从旧到新的一致性快照
    async fn snapshot(&self, phone: &str) -> Result<Vec<GisFix>, StorageError>;
}
