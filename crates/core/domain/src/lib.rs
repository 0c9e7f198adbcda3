//! 网关核心领域模型：终端、会话与定位记录。
//!
//! 本 crate 不依赖任何编解码或存储实现，供各能力模块共享。

pub mod device;
pub mod gis;
pub mod session;

pub use device::{Device, DeviceStatus};
pub use gis::GisFix;
pub use session::{ConnectionHandle, Session, TransportKind};
