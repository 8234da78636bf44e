//! 分页引擎
//!
//! 把逻辑段号解析为驻留槽位，必要时驱逐最久未用的段并从磁盘读入。
//!
//! ```text
//! resolve(n)
//!   ├─ current 槽位持有 n           → 直接返回
//!   ├─ 索引命中                     → 移到年龄队列最新端，返回
//!   ├─ 有空槽位                     → 取一个空槽位
//!   ├─ 否则驱逐最旧槽位             → 脏则先写回，再从索引移除
//!   └─ 读入 n → 插入索引 → 加入年龄队列最新端 → current = 槽位
//! ```
//!
//! `current` 总是年龄队列中最新的槽位，所以快速路径不需要再移动节点。

use super::{segment::Segment, slot::SlotId};
use crate::{
    error::{Error, ErrorKind, Result},
    storage::SegmentStorage,
};

impl<S: SegmentStorage> Segment<S> {
    /// 解析段号，返回持有该段的槽位
    pub(crate) fn resolve(&mut self, segment: u64) -> Result<SlotId> {
        self.stats.accesses += 1;

        if let Some(slot) = self.current {
            if self.slots[slot].segment == segment {
                self.stats.hits += 1;
                return Ok(slot);
            }
        }

        if let Some(slot) = self.index.find(segment) {
            let handle = self.slots[slot].age.ok_or_else(|| {
                log::error!("[PAGER] resident slot {} missing from age queue", slot);
                Error::new(ErrorKind::InvalidState, "Resident slot missing from age queue")
            })?;
            if !self.age.touch(handle) {
                log::error!("[PAGER] stale age handle {} for slot {}", handle, slot);
                return Err(Error::new(ErrorKind::InvalidState, "Stale age queue handle"));
            }
            self.stats.hits += 1;
            self.current = Some(slot);
            log::trace!("[PAGER] segment {} HIT in slot {}", segment, slot);
            return Ok(slot);
        }

        self.stats.misses += 1;
        let slot = match self.free_slots.pop() {
            Some(slot) => slot,
            None => self.evict_oldest()?,
        };
        self.load(segment, slot)?;
        Ok(slot)
    }

    /// 驱逐最旧的驻留段，返回空出来的槽位
    ///
    /// 写回失败时不改变任何状态。
    fn evict_oldest(&mut self) -> Result<SlotId> {
        let slot = self.age.peek_oldest().ok_or_else(|| {
            log::error!("[PAGER] no free slot and age queue is empty");
            Error::new(ErrorKind::InvalidState, "No slot available for eviction")
        })?;

        if self.slots[slot].is_dirty() {
            self.write_back(slot)?;
        }

        let old = self.slots[slot].segment;
        self.age.pop_oldest();
        if self.index.remove(old) != Some(slot) {
            log::error!("[PAGER] evicted segment {} not indexed to slot {}", old, slot);
            return Err(Error::new(ErrorKind::InvalidState, "Evicted segment missing from index"));
        }
        self.slots[slot].clear();
        if self.current == Some(slot) {
            self.current = None;
        }
        self.stats.evictions += 1;
        log::debug!("[PAGER] evicted segment {} from slot {}", old, slot);
        Ok(slot)
    }

    /// 把段读入空槽位
    ///
    /// 读取失败时槽位回到空闲列表，不会留下部分填充的缓冲区。
    fn load(&mut self, segment: u64, slot: SlotId) -> Result<()> {
        if let Err(e) = self.file.read_tile(segment, &mut self.slots[slot].data) {
            log::error!("[PAGER] failed to load segment {} into slot {}", segment, slot);
            self.slots[slot].clear();
            self.free_slots.push(slot);
            return Err(e);
        }

        if let Err(e) = self.index.insert(segment, slot) {
            self.slots[slot].clear();
            self.free_slots.push(slot);
            return Err(e);
        }
        let handle = match self.age.push_young(slot) {
            Ok(handle) => handle,
            Err(e) => {
                self.index.remove(segment);
                self.slots[slot].clear();
                self.free_slots.push(slot);
                return Err(e);
            }
        };

        let entry = &mut self.slots[slot];
        entry.assign(segment);
        entry.age = Some(handle);
        self.current = Some(slot);
        self.stats.loads += 1;
        log::debug!("[PAGER] loaded segment {} into slot {}", segment, slot);
        Ok(())
    }

    /// 把脏槽位写回磁盘
    pub(crate) fn write_back(&mut self, slot: SlotId) -> Result<()> {
        let entry = &mut self.slots[slot];
        self.file.write_tile(entry.segment, &entry.data)?;
        entry.mark_clean();
        self.stats.writebacks += 1;
        log::debug!("[PAGER] wrote back segment {} from slot {}", entry.segment, slot);
        Ok(())
    }

    /// 丢弃驻留段（不写回）
    ///
    /// # 返回
    ///
    /// 段原来是否驻留
    pub(crate) fn invalidate(&mut self, segment: u64) -> Result<bool> {
        let Some(slot) = self.index.remove(segment) else {
            return Ok(false);
        };
        let handle = self.slots[slot]
            .age
            .ok_or(Error::new(ErrorKind::InvalidState, "Resident slot missing from age queue"))?;
        if self.age.remove(handle) != Some(slot) {
            log::error!("[PAGER] age handle {} does not belong to slot {}", handle, slot);
            return Err(Error::new(ErrorKind::InvalidState, "Age queue disagrees with slot"));
        }
        self.slots[slot].clear();
        self.free_slots.push(slot);
        if self.current == Some(slot) {
            self.current = None;
        }
        Ok(true)
    }

    /// 检查槽位、索引、年龄队列三者是否一致
    ///
    /// - 索引大小等于非空槽位数量，且每个非空槽位都被索引指向
    /// - 年龄队列恰好包含所有驻留槽位
    /// - 空闲列表恰好包含所有空槽位
    pub fn check_consistency(&self) -> Result<()> {
        let invalid = |message: &'static str| -> Result<()> {
            log::error!("[PAGER] consistency check failed: {}", message);
            Err(Error::new(ErrorKind::InvalidState, message))
        };

        let mut resident = 0;
        for (id, slot) in self.slots.iter().enumerate() {
            if slot.is_empty() {
                if slot.age.is_some() || slot.is_dirty() {
                    return invalid("Empty slot carries state");
                }
                if !self.free_slots.contains(&id) {
                    return invalid("Empty slot missing from free list");
                }
                continue;
            }
            resident += 1;
            if self.index.find(slot.segment) != Some(id) {
                return invalid("Resident slot not in index");
            }
            match slot.age.and_then(|handle| self.age.slot(handle)) {
                Some(owner) if owner == id => {}
                _ => return invalid("Resident slot not in age queue"),
            }
        }

        if self.index.len() != resident {
            return invalid("Index size differs from resident slots");
        }
        if self.age.len() != resident || !self.age.validate() {
            return invalid("Age queue differs from resident slots");
        }
        if self.free_slots.len() + resident != self.slots.len() {
            return invalid("Free list size mismatch");
        }
        if let Some(current) = self.current {
            if self.slots[current].is_empty() || self.age.iter_oldest_first().last() != Some(current) {
                return invalid("Current slot is not the youngest");
            }
        }
        Ok(())
    }
}
