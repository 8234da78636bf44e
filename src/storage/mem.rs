//! 内存存储设备

use super::SegmentStorage;
use crate::error::{Error, ErrorKind, Result};
use alloc::vec::Vec;

/// 基于 `Vec<u8>` 的内存存储
///
/// 在没有文件系统的环境中可以直接使用；同时记录读写次数，
/// 并支持注入读写失败，方便测试错误路径。
#[derive(Debug, Default, Clone)]
pub struct MemStorage {
    data: Vec<u8>,
    reads: u64,
    writes: u64,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemStorage {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建指定大小、内容全 0 的存储
    pub fn with_size(size: usize) -> Self {
        Self {
            data: alloc::vec![0u8; size],
            ..Self::default()
        }
    }

    /// 以已有数据创建存储
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// 原始字节
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 原始字节（可变）
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// 取回原始字节
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// `read_at` 调用次数
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// `write_at` 调用次数
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// 让之后的读操作失败
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// 让之后的写操作失败
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl SegmentStorage for MemStorage {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if self.fail_reads {
            return Err(Error::new(ErrorKind::Io, "Injected read failure"));
        }
        self.reads += 1;
        let len = self.data.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<usize> {
        if self.fail_writes {
            return Err(Error::new(ErrorKind::Io, "Injected write failure"));
        }
        self.writes += 1;
        let start = usize::try_from(offset)
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Offset too large for memory storage"))?;
        let end = start + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        let size = usize::try_from(size)
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Size too large for memory storage"))?;
        self.data
            .try_reserve(size.saturating_sub(self.data.len()))
            .map_err(|_| Error::new(ErrorKind::NoMemory, "Cannot grow memory storage"))?;
        self.data.resize(size, 0);
        Ok(())
    }
}
