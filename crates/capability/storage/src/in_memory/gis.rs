//! 定位环形缓存内存实现

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use domain::GisFix;

use crate::error::StorageError;
use crate::traits::GisStore;

/// 固定容量的定位环形缓存。
///
/// 写满后从最旧一条开始覆盖；`snapshot` 返回从旧到新的拷贝。
pub struct GisRing {
    slots: Vec<GisFix>,
    capacity: usize,
    /// 写满后指向下一个被覆盖的位置（即最旧一条）
    head: usize,
}

impl GisRing {
    pub fn new(capacity: usize) -> Self {
        // 容量 0 会让覆盖分支在空 Vec 上索引，按最小环处理
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn write(&mut self, fix: GisFix) {
        if self.slots.len() < self.capacity {
            self.slots.push(fix);
        } else {
            self.slots[self.head] = fix;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn snapshot(&self) -> Vec<GisFix> {
        let mut out = Vec::with_capacity(self.slots.len());
        out.extend_from_slice(&self.slots[self.head..]);
        out.extend_from_slice(&self.slots[..self.head]);
        out
    }
}

/// 按终端分环的定位缓存。
///
/// 外层表只在首次写入某终端时插入新环；单环的读写由环自身的
/// 互斥锁串行化。
pub struct InMemoryGisStore {
    rings: RwLock<HashMap<String, Arc<Mutex<GisRing>>>>,
    capacity: usize,
}

impl InMemoryGisStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            rings: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    fn ring(&self, phone: &str) -> Result<Arc<Mutex<GisRing>>, StorageError> {
        {
            let rings = self.rings.read().map_err(|_| StorageError::Lock)?;
            if let Some(ring) = rings.get(phone) {
                return Ok(Arc::clone(ring));
            }
        }
        let mut rings = self.rings.write().map_err(|_| StorageError::Lock)?;
        let ring = rings
            .entry(phone.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(GisRing::new(self.capacity))));
        Ok(Arc::clone(ring))
    }
}

#[async_trait]
impl GisStore for InMemoryGisStore {
    async fn write_fix(&self, phone: &str, fix: GisFix) -> Result<(), StorageError> {
        let ring = self.ring(phone)?;
        let mut ring = ring.lock().map_err(|_| StorageError::Lock)?;
        ring.write(fix);
        Ok(())
    }

    async fn snapshot(&self, phone: &str) -> Result<Vec<GisFix>, StorageError> {
        let rings = self.rings.read().map_err(|_| StorageError::Lock)?;
        let Some(ring) = rings.get(phone) else {
            return Ok(Vec::new());
        };
        let ring = ring.lock().map_err(|_| StorageError::Lock)?;
        Ok(ring.snapshot())
    }
}
