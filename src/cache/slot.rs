//! 缓存槽位
//!
//! 每个槽位持有一个段大小的缓冲区，在驱逐时原地复用。

use super::age_queue::AgeHandle;
use crate::{
    consts::EMPTY_SEGMENT,
    error::{Error, ErrorKind, Result},
};
use alloc::vec::Vec;
use bitflags::bitflags;

/// 槽位下标
pub type SlotId = usize;

bitflags! {
    /// 槽位标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SlotFlags: u8 {
        /// 缓冲区中是一个完整读入的段
        const LOADED = 0x01;
        /// 内存中的数据比磁盘新
        const DIRTY  = 0x02;
    }
}

/// 缓存槽位
///
/// # 字段说明
///
/// - `segment`: 当前持有的段号，空槽位为 [`EMPTY_SEGMENT`]
/// - `data`: 段数据缓冲区，初始化时一次性分配
/// - `flags`: 槽位状态
/// - `age`: 在年龄队列中的节点，仅驻留槽位有
pub struct Slot {
    /// 段号
    pub segment: u64,

    /// 段数据
    pub data: Vec<u8>,

    /// 状态标志
    pub flags: SlotFlags,

    /// 年龄队列节点
    pub age: Option<AgeHandle>,
}

impl core::fmt::Debug for Slot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Slot")
            .field("segment", &self.segment)
            .field("data_len", &self.data.len())
            .field("flags", &self.flags)
            .field("age", &self.age)
            .finish()
    }
}

impl Slot {
    /// 创建空槽位
    ///
    /// 缓冲区分配失败返回 `NoMemory`
    pub fn new(tile_size: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(tile_size)
            .map_err(|_| Error::new(ErrorKind::NoMemory, "Cannot allocate segment buffer"))?;
        data.resize(tile_size, 0);
        Ok(Self {
            segment: EMPTY_SEGMENT,
            data,
            flags: SlotFlags::empty(),
            age: None,
        })
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.segment == EMPTY_SEGMENT
    }

    /// 装入段号，状态为已加载且干净
    pub fn assign(&mut self, segment: u64) {
        self.segment = segment;
        self.flags = SlotFlags::LOADED;
    }

    /// 清空槽位（不写回）
    pub fn clear(&mut self) {
        self.segment = EMPTY_SEGMENT;
        self.flags = SlotFlags::empty();
        self.age = None;
    }

    /// 标记为脏
    pub fn mark_dirty(&mut self) {
        self.flags.insert(SlotFlags::DIRTY);
    }

    /// 标记为干净
    pub fn mark_clean(&mut self) {
        self.flags.remove(SlotFlags::DIRTY);
    }

    /// 是否是脏槽位
    pub fn is_dirty(&self) -> bool {
        self.flags.contains(SlotFlags::DIRTY)
    }

    /// 是否已加载
    pub fn is_loaded(&self) -> bool {
        self.flags.contains(SlotFlags::LOADED)
    }

    /// 第 `index` 个元素的字节范围
    #[inline]
    pub fn element(&self, index: usize, element_size: usize) -> &[u8] {
        let start = index * element_size;
        &self.data[start..start + element_size]
    }

    /// 第 `index` 个元素的字节范围（可变）
    #[inline]
    pub fn element_mut(&mut self, index: usize, element_size: usize) -> &mut [u8] {
        let start = index * element_size;
        &mut self.data[start..start + element_size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_creation() {
        let slot = Slot::new(128).unwrap();
        assert!(slot.is_empty());
        assert_eq!(slot.data.len(), 128);
        assert_eq!(slot.flags, SlotFlags::empty());
        assert!(slot.age.is_none());
    }

    #[test]
    fn test_assign_and_clear() {
        let mut slot = Slot::new(16).unwrap();
        slot.assign(7);
        assert!(!slot.is_empty());
        assert!(slot.is_loaded());
        assert!(!slot.is_dirty());

        slot.mark_dirty();
        slot.age = Some(3);
        assert!(slot.is_dirty());

        slot.clear();
        assert!(slot.is_empty());
        assert!(!slot.is_loaded());
        assert!(!slot.is_dirty());
        assert!(slot.age.is_none());
    }

    #[test]
    fn test_dirty_flag() {
        let mut slot = Slot::new(16).unwrap();
        slot.assign(1);
        slot.mark_dirty();
        assert!(slot.flags.contains(SlotFlags::DIRTY | SlotFlags::LOADED));
        slot.mark_clean();
        assert!(!slot.is_dirty());
        assert!(slot.is_loaded());
    }

    #[test]
    fn test_element_access() {
        let mut slot = Slot::new(8).unwrap();
        slot.element_mut(2, 2).copy_from_slice(&[0x12, 0x34]);
        assert_eq!(slot.element(2, 2), &[0x12, 0x34]);
        assert_eq!(&slot.data[4..6], &[0x12, 0x34]);
    }

    #[test]
    fn test_huge_allocation_fails() {
        let err = Slot::new(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMemory);
    }
}
