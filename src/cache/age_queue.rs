//! 年龄队列
//!
//! 固定容量的环形双向链表，按访问时间从旧到新排列槽位，
//! 用于 O(1) 选出驱逐对象。
//!
//! 节点存放在数组中，用下标互相链接；`nodes[capacity]` 是哨兵：
//!
//! ```text
//!   sentinel.next ─► [oldest] ◄──► ... ◄──► [youngest] ◄─ sentinel.prev
//! ```
//!
//! 未使用的节点在 `free` 中，其 `prev`/`next` 为 [`NIL`]。

use super::slot::SlotId;
use crate::error::{Error, ErrorKind, Result};
use alloc::vec::Vec;

/// 年龄队列节点下标
pub type AgeHandle = usize;

const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct AgeNode {
    slot: SlotId,
    prev: usize,
    next: usize,
}

impl AgeNode {
    const UNLINKED: Self = Self {
        slot: NIL,
        prev: NIL,
        next: NIL,
    };

    fn is_linked(&self) -> bool {
        self.prev != NIL
    }
}

/// 年龄队列
#[derive(Debug)]
pub struct AgeQueue {
    nodes: Vec<AgeNode>,
    free: Vec<AgeHandle>,
    len: usize,
}

impl AgeQueue {
    /// 创建容量为 `capacity` 的空队列
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let oom = |_| Error::new(ErrorKind::NoMemory, "Cannot allocate age queue");
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(capacity + 1).map_err(oom)?;
        nodes.resize(capacity + 1, AgeNode::UNLINKED);
        let mut free = Vec::new();
        free.try_reserve_exact(capacity).map_err(oom)?;
        free.extend((0..capacity).rev());

        let sentinel = capacity;
        nodes[sentinel].prev = sentinel;
        nodes[sentinel].next = sentinel;

        Ok(Self { nodes, free, len: 0 })
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.nodes.len() - 1
    }

    /// 队列中的节点数
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 节点对应的槽位
    pub fn slot(&self, handle: AgeHandle) -> Option<SlotId> {
        self.nodes
            .get(handle)
            .filter(|node| handle != self.sentinel() && node.is_linked())
            .map(|node| node.slot)
    }

    /// 把槽位作为最新节点加入队列
    ///
    /// 队列已满返回 `InvalidState`
    pub fn push_young(&mut self, slot: SlotId) -> Result<AgeHandle> {
        let handle = self
            .free
            .pop()
            .ok_or(Error::new(ErrorKind::InvalidState, "Age queue is full"))?;
        self.nodes[handle].slot = slot;
        self.attach_young(handle);
        self.len += 1;
        Ok(handle)
    }

    /// 把节点移动到最新端
    ///
    /// 节点不在队列中时返回 `false`
    pub fn touch(&mut self, handle: AgeHandle) -> bool {
        if self.slot(handle).is_none() {
            return false;
        }
        let sentinel = self.sentinel();
        if self.nodes[sentinel].prev != handle {
            self.detach(handle);
            self.attach_young(handle);
        }
        true
    }

    /// 最旧节点对应的槽位
    pub fn peek_oldest(&self) -> Option<SlotId> {
        let oldest = self.nodes[self.sentinel()].next;
        (oldest != self.sentinel()).then(|| self.nodes[oldest].slot)
    }

    /// 移除最旧节点，返回其槽位
    pub fn pop_oldest(&mut self) -> Option<SlotId> {
        let oldest = self.nodes[self.sentinel()].next;
        if oldest == self.sentinel() {
            return None;
        }
        self.remove(oldest)
    }

    /// 移除指定节点，返回其槽位
    pub fn remove(&mut self, handle: AgeHandle) -> Option<SlotId> {
        let slot = self.slot(handle)?;
        self.detach(handle);
        self.nodes[handle] = AgeNode::UNLINKED;
        self.free.push(handle);
        self.len -= 1;
        Some(slot)
    }

    /// 从旧到新遍历槽位
    pub fn iter_oldest_first(&self) -> impl Iterator<Item = SlotId> + '_ {
        let sentinel = self.sentinel();
        let mut cursor = self.nodes[sentinel].next;
        core::iter::from_fn(move || {
            if cursor == sentinel {
                return None;
            }
            let node = &self.nodes[cursor];
            cursor = node.next;
            Some(node.slot)
        })
    }

    /// 检查环形链表的完整性
    pub fn validate(&self) -> bool {
        let sentinel = self.sentinel();
        let mut count = 0;
        let mut prev = sentinel;
        let mut cursor = self.nodes[sentinel].next;
        while cursor != sentinel {
            if cursor >= sentinel || count > self.len {
                return false;
            }
            let node = &self.nodes[cursor];
            if node.prev != prev {
                return false;
            }
            prev = cursor;
            cursor = node.next;
            count += 1;
        }
        count == self.len && self.nodes[sentinel].prev == prev && self.free.len() + self.len == self.capacity()
    }

    fn sentinel(&self) -> usize {
        self.nodes.len() - 1
    }

    fn detach(&mut self, handle: AgeHandle) {
        let AgeNode { prev, next, .. } = self.nodes[handle];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn attach_young(&mut self, handle: AgeHandle) {
        let sentinel = self.sentinel();
        let youngest = self.nodes[sentinel].prev;
        self.nodes[handle].prev = youngest;
        self.nodes[handle].next = sentinel;
        self.nodes[youngest].next = handle;
        self.nodes[sentinel].prev = handle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn order(queue: &AgeQueue) -> Vec<SlotId> {
        queue.iter_oldest_first().collect()
    }

    #[test]
    fn test_empty_queue() {
        let mut queue = AgeQueue::with_capacity(4).unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.capacity(), 4);
        assert_eq!(queue.peek_oldest(), None);
        assert_eq!(queue.pop_oldest(), None);
        assert!(queue.validate());
    }

    #[test]
    fn test_push_and_pop_order() {
        let mut queue = AgeQueue::with_capacity(3).unwrap();
        for slot in [10, 11, 12] {
            queue.push_young(slot).unwrap();
        }
        assert_eq!(order(&queue), vec![10, 11, 12]);
        assert_eq!(queue.pop_oldest(), Some(10));
        assert_eq!(queue.pop_oldest(), Some(11));
        assert_eq!(queue.len(), 1);
        assert!(queue.validate());
    }

    #[test]
    fn test_full_queue_rejects_push() {
        let mut queue = AgeQueue::with_capacity(2).unwrap();
        queue.push_young(0).unwrap();
        queue.push_young(1).unwrap();
        assert_eq!(queue.push_young(2).unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_touch_moves_to_young_end() {
        let mut queue = AgeQueue::with_capacity(4).unwrap();
        let handles: Vec<_> = (0..4).map(|s| queue.push_young(s).unwrap()).collect();

        assert!(queue.touch(handles[0]));
        assert_eq!(order(&queue), vec![1, 2, 3, 0]);

        assert!(queue.touch(handles[2]));
        assert_eq!(order(&queue), vec![1, 3, 0, 2]);

        // 已经是最新的节点
        assert!(queue.touch(handles[2]));
        assert_eq!(order(&queue), vec![1, 3, 0, 2]);
        assert_eq!(queue.peek_oldest(), Some(1));
        assert!(queue.validate());
    }

    #[test]
    fn test_remove_and_reuse() {
        let mut queue = AgeQueue::with_capacity(3).unwrap();
        let a = queue.push_young(0).unwrap();
        let b = queue.push_young(1).unwrap();
        queue.push_young(2).unwrap();

        assert_eq!(queue.remove(b), Some(1));
        assert_eq!(queue.remove(b), None);
        assert!(!queue.touch(b));
        assert_eq!(queue.slot(b), None);
        assert_eq!(queue.slot(a), Some(0));
        assert_eq!(order(&queue), vec![0, 2]);

        queue.push_young(7).unwrap();
        assert_eq!(order(&queue), vec![0, 2, 7]);
        assert!(queue.validate());
    }

    #[test]
    fn test_invalid_handles() {
        let mut queue = AgeQueue::with_capacity(2).unwrap();
        // 哨兵和越界下标都不是合法节点
        assert_eq!(queue.slot(2), None);
        assert_eq!(queue.slot(99), None);
        assert!(!queue.touch(2));
        assert_eq!(queue.remove(99), None);
    }
}
