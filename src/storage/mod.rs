//! 段文件存储抽象
//!
//! storage/device.rs 定义随机访问字节设备接口 [`SegmentStorage`]
//! storage/file.rs 提供 [`SegmentFile`]，按段读写并把不完整的读写变成错误
//! storage/mem.rs 提供内存设备 [`MemStorage`]（no_std 可用，也用于测试）
//! storage/std_file.rs 为 `std::fs::File` 实现 [`SegmentStorage`]（需要 `std` 特性）

mod device;
mod file;
mod mem;
#[cfg(feature = "std")]
mod std_file;

pub use device::SegmentStorage;
pub use file::SegmentFile;
pub(crate) use file::{read_exact_at, write_all_at};
pub use mem::MemStorage;
