//! 存储层错误类型定义

/// 注册中心与定位缓存错误。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 手机号没有对应的终端记录
    #[error("device not found, phone={0}")]
    DeviceNotFound(String),

    /// 读写锁中毒
    #[error("lock poisoned")]
    Lock,
}
