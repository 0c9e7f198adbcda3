//! # 网关存储模块
//!
//! 提供消息处理器依赖的两类进程内存储：
//!
//! - **终端注册中心** (`DeviceStore`)：以手机号为主键的终端记录表，
//!   附带车牌号到手机号的二级索引。`put` 幂等，重复写入即覆盖并
//!   维护索引一致。
//! - **定位环形缓存** (`GisStore`)：按终端保留最近 N 条定位记录，
//!   写满后覆盖最旧一条。
//!
//! ## 设计约束
//!
//! - 接口为 async Trait，handler 通过 `Arc<dyn DeviceStore>` 访问；
//! - 内存实现使用 `RwLock<HashMap>`，单条环形缓存内部以互斥锁串行化；
//! - 注册中心保证手机号与车牌号在活跃记录上互为双射。

pub mod error;
pub mod in_memory;
pub mod traits;

pub use error::StorageError;
pub use in_memory::{GisRing, InMemoryDeviceStore, InMemoryGisStore};
pub use traits::{DeviceStore, GisStore};
