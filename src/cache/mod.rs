//! 段缓存模块
//!
//! 这个模块提供完整的段分页缓存实现：在固定数量的内存槽位上
//! 按需装入磁盘上的段，按最近最少使用驱逐，脏段写回。
//!
//! # 主要组件
//!
//! - [`Slot`] - 单个槽位，持有一个段的缓冲区和状态
//! - [`AgeQueue`] - 年龄队列，O(1) 找到最久未用的槽位
//! - [`SegmentIndex`] - 段号到槽位的索引
//! - [`Segment`] - 缓存本体：分页引擎 + 公共读写接口
//! - [`CacheStats`] - 缓存统计信息
//!
//! # 设计原理
//!
//! 所有结构都用数组下标互相引用，不使用裸指针：
//!
//! 1. **槽位池**：`Vec<Slot>`，初始化时一次分配，之后只复用内容
//! 2. **年龄队列**：节点数组上的环形双向链表，`Slot::age` 指回节点
//! 3. **段索引**：`BTreeMap<u64, SlotId>`，只包含驻留段
//! 4. **当前槽位**：最近一次访问的槽位，连续访问同一段时跳过索引查找
//!
//! 三个结构总是一起修改，不变量由 [`Segment::check_consistency`] 检查。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use segment_core::{format, Segment, SegmentOptions};
//!
//! // 100x100 的矩阵，每个元素 2 字节，8x8 的段
//! format(&mut file, 100, 100, 8, 8, 2)?;
//! let mut seg = Segment::init(file, SegmentOptions::with_pool_size(4))?;
//!
//! seg.put(50, 50, &0x1234u16.to_le_bytes())?;
//! let mut out = [0u8; 2];
//! seg.get(50, 50, &mut out)?;
//!
//! // 写回所有脏段并取回文件
//! let file = seg.release()?;
//! ```
//!
//! # 性能特性
//!
//! - **连续访问同一段**: O(1) - 当前槽位快速路径
//! - **驻留段查找**: O(log n) - BTreeMap
//! - **LRU 驱逐**: O(1) - 年龄队列最旧端
//! - **刷新**: O(n) - n 为槽位数量

mod age_queue;
mod index;
mod pager;
mod segment;
mod slot;

pub use age_queue::{AgeHandle, AgeQueue};
pub use index::SegmentIndex;
pub use segment::{CacheStats, Segment};
pub use slot::{Slot, SlotFlags, SlotId};
