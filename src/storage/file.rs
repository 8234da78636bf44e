//! 按段读写的段文件包装器

use super::SegmentStorage;
use crate::{
    error::{Error, ErrorKind, Result},
    types::SegmentConfig,
};

/// 段文件
///
/// 把 [`SegmentStorage`] 和几何参数组合在一起，提供按段的精确读写。
/// 读写不完整一律视为 `Io` 错误，绝不返回部分填充的缓冲区。
pub struct SegmentFile<S> {
    /// 底层存储
    storage: S,
    /// 几何参数
    config: SegmentConfig,
    /// 物理段读取次数
    tile_reads: u64,
    /// 物理写入次数（整段写回和行直写）
    tile_writes: u64,
}

impl<S: SegmentStorage> SegmentFile<S> {
    /// 创建段文件包装器
    pub fn new(storage: S, config: SegmentConfig) -> Self {
        Self {
            storage,
            config,
            tile_reads: 0,
            tile_writes: 0,
        }
    }

    /// 几何参数
    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }

    /// 底层存储的引用
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 底层存储的可变引用
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// 取回底层存储
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// 物理段读取次数
    pub fn tile_reads(&self) -> u64 {
        self.tile_reads
    }

    /// 物理写入次数
    pub fn tile_writes(&self) -> u64 {
        self.tile_writes
    }

    /// 读取整个段
    ///
    /// `buf` 长度必须等于段大小。
    pub fn read_tile(&mut self, segment: u64, buf: &mut [u8]) -> Result<()> {
        self.check_tile(segment, buf.len())?;
        let offset = self.config.seek_offset(segment, 0);
        read_exact_at(&mut self.storage, offset, buf)?;
        self.tile_reads += 1;
        Ok(())
    }

    /// 写入整个段
    pub fn write_tile(&mut self, segment: u64, buf: &[u8]) -> Result<()> {
        self.check_tile(segment, buf.len())?;
        let offset = self.config.seek_offset(segment, 0);
        write_all_at(&mut self.storage, offset, buf)?;
        self.tile_writes += 1;
        Ok(())
    }

    /// 从段内第 `index` 个元素开始写入连续数据（不经过缓存）
    pub fn write_span(&mut self, segment: u64, index: u64, buf: &[u8]) -> Result<()> {
        let start = index * self.config.element_size as u64;
        if segment >= self.config.total_segments || start + buf.len() as u64 > self.config.tile_size_bytes {
            return Err(Error::new(ErrorKind::InvalidState, "Span write crosses segment boundary"));
        }
        let offset = self.config.seek_offset(segment, index);
        write_all_at(&mut self.storage, offset, buf)?;
        self.tile_writes += 1;
        Ok(())
    }

    /// 刷新底层存储
    pub fn sync(&mut self) -> Result<()> {
        self.storage.flush()
    }

    fn check_tile(&self, segment: u64, len: usize) -> Result<()> {
        if segment >= self.config.total_segments {
            log::error!(
                "[SEGMENT] segment {} beyond end of file ({} segments)",
                segment,
                self.config.total_segments
            );
            return Err(Error::new(ErrorKind::InvalidState, "Segment number out of range"));
        }
        if len != self.config.tile_bytes() {
            return Err(Error::new(ErrorKind::InvalidInput, "Buffer size does not match segment size"));
        }
        Ok(())
    }
}

/// 精确读取 `buf.len()` 字节，读到末尾视为错误
pub(crate) fn read_exact_at<S: SegmentStorage>(storage: &mut S, offset: u64, buf: &mut [u8]) -> Result<()> {
    let mut done = 0;
    while done < buf.len() {
        let n = storage.read_at(offset + done as u64, &mut buf[done..])?;
        if n == 0 {
            log::error!(
                "[SEGMENT] short read at offset {:#x}: {}/{} bytes",
                offset,
                done,
                buf.len()
            );
            return Err(Error::new(ErrorKind::Io, "Incomplete read from segment file"));
        }
        done += n;
    }
    Ok(())
}

/// 完整写入 `buf`，写入 0 字节视为错误
pub(crate) fn write_all_at<S: SegmentStorage>(storage: &mut S, offset: u64, buf: &[u8]) -> Result<()> {
    let mut done = 0;
    while done < buf.len() {
        let n = storage.write_at(offset + done as u64, &buf[done..])?;
        if n == 0 {
            log::error!(
                "[SEGMENT] short write at offset {:#x}: {}/{} bytes",
                offset,
                done,
                buf.len()
            );
            return Err(Error::new(ErrorKind::Io, "Incomplete write to segment file"));
        }
        done += n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{consts::HEADER_SIZE, storage::MemStorage};
    use alloc::vec;

    fn file() -> SegmentFile<MemStorage> {
        let config = SegmentConfig::new(8, 8, 4, 4, 1).unwrap();
        let storage = MemStorage::with_size(config.file_size() as usize);
        SegmentFile::new(storage, config)
    }

    #[test]
    fn test_tile_read_write() {
        let mut f = file();
        let data = vec![7u8; 16];
        f.write_tile(3, &data).unwrap();

        let mut out = vec![0u8; 16];
        f.read_tile(3, &mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(f.tile_reads(), 1);
        assert_eq!(f.tile_writes(), 1);

        let raw = f.storage().as_bytes();
        let start = (HEADER_SIZE + 3 * 16) as usize;
        assert_eq!(&raw[start..start + 16], &data[..]);
    }

    #[test]
    fn test_write_span() {
        let mut f = file();
        f.write_span(1, 5, &[1, 2, 3]).unwrap();
        let mut out = vec![0u8; 16];
        f.read_tile(1, &mut out).unwrap();
        assert_eq!(&out[5..8], &[1, 2, 3]);
        assert_eq!(out[4], 0);

        assert!(f.write_span(1, 14, &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_rejects_bad_segment_and_size() {
        let mut f = file();
        let mut buf = vec![0u8; 16];
        assert_eq!(f.read_tile(4, &mut buf).unwrap_err().kind(), ErrorKind::InvalidState);
        let mut small = vec![0u8; 8];
        assert_eq!(f.read_tile(0, &mut small).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_short_read_is_io_error() {
        let config = SegmentConfig::new(8, 8, 4, 4, 1).unwrap();
        // 最后一个段只有一半数据
        let storage = MemStorage::with_size(config.file_size() as usize - 8);
        let mut f = SegmentFile::new(storage, config);
        let mut buf = vec![0u8; 16];
        assert!(f.read_tile(2, &mut buf).is_ok());
        assert!(f.read_tile(3, &mut buf).unwrap_err().is_io());
        assert_eq!(f.tile_reads(), 1);
    }

    #[test]
    fn test_failed_write_propagates() {
        let mut f = file();
        f.storage_mut().set_fail_writes(true);
        assert!(f.write_tile(0, &[0u8; 16]).unwrap_err().is_io());
        assert_eq!(f.tile_writes(), 0);
    }
}
