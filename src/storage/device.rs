//! 存储设备接口

use crate::error::Result;

/// 段文件底层存储接口
///
/// 实现此 trait 以提供随机访问的字节设备。段缓存独占该设备，
/// 生命周期内不会有其他线程或进程同时读写。
///
/// # 示例
///
/// ```rust,ignore
/// use segment_core::{SegmentStorage, Result};
///
/// struct MyDevice {
///     // ...
/// }
///
/// impl SegmentStorage for MyDevice {
///     fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
///         // 从 offset 读取，返回实际读取的字节数
///         Ok(buf.len())
///     }
///
///     fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<usize> {
///         Ok(buf.len())
///     }
///
///     fn size(&self) -> Result<u64> {
///         Ok(0)
///     }
///
///     fn set_size(&mut self, size: u64) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait SegmentStorage {
    /// 从 `offset` 处读取数据
    ///
    /// # 返回
    ///
    /// 成功返回实际读取的字节数，到达末尾时可能小于 `buf.len()`
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// 向 `offset` 处写入数据
    ///
    /// # 返回
    ///
    /// 成功返回实际写入的字节数
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<usize>;

    /// 当前设备大小（字节）
    fn size(&self) -> Result<u64>;

    /// 调整设备大小，扩展部分读出为 0
    fn set_size(&mut self, size: u64) -> Result<()>;

    /// 把设备缓冲刷新到持久存储
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
