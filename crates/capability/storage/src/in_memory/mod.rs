//! 内存存储实现。
//!
//! 单进程部署下即为线上实现；handler 持 `Arc<dyn …>` 访问。

mod device;
mod gis;

pub use device::InMemoryDeviceStore;
pub use gis::{GisRing, InMemoryGisStore};
