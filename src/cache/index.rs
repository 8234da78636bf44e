//! 段索引：段号 → 槽位

use super::slot::SlotId;
use crate::error::{Error, ErrorKind, Result};
use alloc::collections::BTreeMap;

/// 段索引
///
/// 只包含驻留（非空）槽位。用于在 O(log n) 内判断某个段是否已在内存中。
#[derive(Debug, Default)]
pub struct SegmentIndex {
    map: BTreeMap<u64, SlotId>,
}

impl SegmentIndex {
    /// 创建空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 查找段所在的槽位
    #[inline]
    pub fn find(&self, segment: u64) -> Option<SlotId> {
        self.map.get(&segment).copied()
    }

    /// 段是否驻留
    pub fn contains(&self, segment: u64) -> bool {
        self.map.contains_key(&segment)
    }

    /// 插入映射
    ///
    /// 段已经在索引中时返回 `InvalidState`，原映射保持不变
    pub fn insert(&mut self, segment: u64, slot: SlotId) -> Result<()> {
        match self.map.entry(segment) {
            alloc::collections::btree_map::Entry::Occupied(entry) => {
                log::error!(
                    "[PAGER] segment {} already resident in slot {}",
                    segment,
                    entry.get()
                );
                Err(Error::new(ErrorKind::InvalidState, "Segment already in index"))
            }
            alloc::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(slot);
                Ok(())
            }
        }
    }

    /// 移除映射，返回原来的槽位
    pub fn remove(&mut self, segment: u64) -> Option<SlotId> {
        self.map.remove(&segment)
    }

    /// 驻留段数量
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 按段号升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (u64, SlotId)> + '_ {
        self.map.iter().map(|(&segment, &slot)| (segment, slot))
    }

    /// 清空索引
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_insert_find_remove() {
        let mut index = SegmentIndex::new();
        assert!(index.is_empty());

        index.insert(42, 0).unwrap();
        index.insert(7, 1).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.find(42), Some(0));
        assert!(index.contains(7));
        assert_eq!(index.find(8), None);

        assert_eq!(index.remove(42), Some(0));
        assert_eq!(index.remove(42), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut index = SegmentIndex::new();
        index.insert(3, 0).unwrap();
        let err = index.insert(3, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(index.find(3), Some(0));
    }

    #[test]
    fn test_iter_sorted() {
        let mut index = SegmentIndex::new();
        for (segment, slot) in [(9, 0), (1, 1), (5, 2)] {
            index.insert(segment, slot).unwrap();
        }
        let entries: Vec<_> = index.iter().collect();
        assert_eq!(entries, alloc::vec![(1, 1), (5, 2), (9, 0)]);

        index.clear();
        assert!(index.is_empty());
    }
}
