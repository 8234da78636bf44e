//! segment_core: 段分页缓存
//!
//! 让栅格算法像访问内存数组一样访问远大于物理内存的二维矩阵。
//! 矩阵按固定大小的段（tile）存放在磁盘文件中，内存里只保留
//! 有限数量的段，按最近最少使用驱逐，修改过的段在驱逐时写回。
//!
//! - **零裸指针**：槽位、年龄队列、索引之间全部用下标引用
//! - **no_std + alloc** 核心，`std` 特性提供文件后端
//! - **显式错误**：越界、I/O、内存不足、内部不一致各有错误类别
//!
//! # 示例
//!
//! ```rust,ignore
//! use segment_core::{Segment, SegmentOptions, Result};
//!
//! fn main() -> Result<()> {
//!     let mut seg = segment_core::open("/tmp/cost.seg", 10_000, 10_000, 64, 64, 8,
//!                                      SegmentOptions::with_pool_size(32))?;
//!
//!     seg.put(5_000, 5_000, &1.5f64.to_le_bytes())?;
//!
//!     let mut out = [0u8; 8];
//!     seg.get(5_000, 5_000, &mut out)?;
//!
//!     seg.close("/tmp/cost.seg")
//! }
//! ```
//!
//! # 模块结构
//!
//! - [`error`] - 错误类型定义
//! - [`consts`] - 常量定义
//! - [`types`] - 文件头与几何参数
//! - [`geometry`] - 段寻址
//! - [`storage`] - 存储抽象和段文件 I/O
//! - [`header`] - 格式化与文件头验证
//! - [`cache`] - 分页缓存

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

// ===== 核心模块 =====

/// 错误处理
pub mod error;

/// 常量定义
pub mod consts;

/// 数据结构定义
pub mod types;

/// 段寻址
pub mod geometry;

/// 存储抽象
pub mod storage;

/// 段文件头操作
pub mod header;

/// 段缓存
pub mod cache;

/// CRC32 校验和计算
pub(crate) mod crc;

/// 基于路径的打开与关闭
#[cfg(feature = "std")]
pub mod open;

// ===== 公共导出 =====

// 错误处理
pub use error::{Error, ErrorKind, Result};

// 数据结构
pub use types::{SegmentConfig, SegmentHeader, SegmentOptions};

// 存储
pub use storage::{MemStorage, SegmentFile, SegmentStorage};

// 文件头
pub use header::{format, format_nofill, read_header};

// 缓存
pub use cache::{CacheStats, Segment, SlotFlags};

// 常量
pub use consts::{DEFAULT_POOL_SIZE, HEADER_SIZE};

// 文件路径接口（当启用时）
#[cfg(feature = "std")]
pub use open::{open, open_existing};
