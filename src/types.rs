//! 段缓存数据结构定义
//!
//! - [`SegmentHeader`] - 段文件头（磁盘格式）
//! - [`SegmentConfig`] - 由文件头推导出的不可变几何参数
//! - [`SegmentOptions`] - 打开缓存时的运行参数

use crate::{
    consts::*,
    error::{Error, ErrorKind, Result},
};
use byteorder::{ByteOrder, LittleEndian};

/// 段文件头
///
/// 磁盘布局（小端序，共 [`HEADER_SIZE`] 字节）：
///
/// ```text
/// 0   magic        [u8; 4]  "GSEG"
/// 4   version      u32
/// 8   rows         u64
/// 16  cols         u64
/// 24  tile_rows    u32
/// 28  tile_cols    u32
/// 32  element_size u32
/// 36  checksum     u32      crc32(bytes[0..36])
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// 魔数
    pub magic: [u8; 4],
    /// 格式版本
    pub version: u32,
    /// 矩阵总行数
    pub rows: u64,
    /// 矩阵总列数
    pub cols: u64,
    /// 每段行数
    pub tile_rows: u32,
    /// 每段列数
    pub tile_cols: u32,
    /// 每个元素的字节数
    pub element_size: u32,
    /// 文件头校验和
    pub checksum: u32,
}

impl SegmentHeader {
    /// 根据几何参数构造文件头（校验和尚未计算）
    pub fn new(config: &SegmentConfig) -> Self {
        Self {
            magic: SEGMENT_MAGIC,
            version: SEGMENT_VERSION,
            rows: config.rows,
            cols: config.cols,
            tile_rows: config.tile_rows,
            tile_cols: config.tile_cols,
            element_size: config.element_size,
            checksum: 0,
        }
    }

    /// 编码为磁盘格式
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[HDR_OFF_MAGIC..HDR_OFF_MAGIC + 4].copy_from_slice(&self.magic);
        LittleEndian::write_u32(&mut buf[HDR_OFF_VERSION..], self.version);
        LittleEndian::write_u64(&mut buf[HDR_OFF_ROWS..], self.rows);
        LittleEndian::write_u64(&mut buf[HDR_OFF_COLS..], self.cols);
        LittleEndian::write_u32(&mut buf[HDR_OFF_TILE_ROWS..], self.tile_rows);
        LittleEndian::write_u32(&mut buf[HDR_OFF_TILE_COLS..], self.tile_cols);
        LittleEndian::write_u32(&mut buf[HDR_OFF_ELEMENT_SIZE..], self.element_size);
        LittleEndian::write_u32(&mut buf[HDR_OFF_CHECKSUM..], self.checksum);
        buf
    }

    /// 从磁盘格式解码（不做任何验证）
    pub fn from_bytes(buf: &[u8; HEADER_SIZE as usize]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[HDR_OFF_MAGIC..HDR_OFF_MAGIC + 4]);
        Self {
            magic,
            version: LittleEndian::read_u32(&buf[HDR_OFF_VERSION..]),
            rows: LittleEndian::read_u64(&buf[HDR_OFF_ROWS..]),
            cols: LittleEndian::read_u64(&buf[HDR_OFF_COLS..]),
            tile_rows: LittleEndian::read_u32(&buf[HDR_OFF_TILE_ROWS..]),
            tile_cols: LittleEndian::read_u32(&buf[HDR_OFF_TILE_COLS..]),
            element_size: LittleEndian::read_u32(&buf[HDR_OFF_ELEMENT_SIZE..]),
            checksum: LittleEndian::read_u32(&buf[HDR_OFF_CHECKSUM..]),
        }
    }

    /// 检查魔数
    pub fn is_valid(&self) -> bool {
        self.magic == SEGMENT_MAGIC
    }
}

/// 段缓存几何参数
///
/// 创建后不可变。所有派生量在 [`SegmentConfig::new`] 中一次性计算并检查溢出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    /// 矩阵总行数
    pub rows: u64,
    /// 矩阵总列数
    pub cols: u64,
    /// 每段行数
    pub tile_rows: u32,
    /// 每段列数
    pub tile_cols: u32,
    /// 每个元素的字节数
    pub element_size: u32,
    /// 每一行段的数量（水平方向）
    pub tiles_per_row: u64,
    /// 每一列段的数量（垂直方向）
    pub tiles_per_col: u64,
    /// 最右侧不完整段的列数（0 表示没有）
    pub spill_cols: u32,
    /// 最下方不完整段的行数（0 表示没有）
    pub spill_rows: u32,
    /// 每段元素个数
    pub tile_len: u64,
    /// 每段字节数
    pub tile_size_bytes: u64,
    /// 段总数
    pub total_segments: u64,
    /// 段维度均为 2 的幂，可以使用移位寻址
    pub fast_address: bool,
    /// 段大小和元素大小均为 2 的幂，可以使用移位计算文件偏移
    pub fast_seek: bool,
    pub(crate) row_shift: u32,
    pub(crate) col_shift: u32,
    pub(crate) row_mask: u64,
    pub(crate) col_mask: u64,
    pub(crate) tile_shift: u32,
    pub(crate) element_shift: u32,
}

impl SegmentConfig {
    /// 验证参数并推导几何参数
    ///
    /// # 错误
    ///
    /// - 任何维度为 0 返回 `InvalidInput`
    /// - 段大小或文件大小溢出返回 `InvalidInput`
    pub fn new(rows: u64, cols: u64, tile_rows: u32, tile_cols: u32, element_size: u32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "Matrix dimensions must be positive"));
        }
        if tile_rows == 0 || tile_cols == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "Segment dimensions must be positive"));
        }
        if element_size == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "Element size must be positive"));
        }

        let overflow = || Error::new(ErrorKind::InvalidInput, "Segment geometry overflows");

        let tiles_per_row = cols.div_ceil(tile_cols as u64);
        let tiles_per_col = rows.div_ceil(tile_rows as u64);
        let tile_len = (tile_rows as u64).checked_mul(tile_cols as u64).ok_or_else(overflow)?;
        let tile_size_bytes = tile_len.checked_mul(element_size as u64).ok_or_else(overflow)?;
        if usize::try_from(tile_size_bytes).is_err() {
            return Err(Error::new(ErrorKind::InvalidInput, "Segment too large for memory"));
        }
        let total_segments = tiles_per_row.checked_mul(tiles_per_col).ok_or_else(overflow)?;
        total_segments
            .checked_mul(tile_size_bytes)
            .and_then(|body| body.checked_add(HEADER_SIZE))
            .ok_or_else(overflow)?;

        let fast_address = tile_rows.is_power_of_two() && tile_cols.is_power_of_two();
        let fast_seek = tile_size_bytes.is_power_of_two() && element_size.is_power_of_two();

        Ok(Self {
            rows,
            cols,
            tile_rows,
            tile_cols,
            element_size,
            tiles_per_row,
            tiles_per_col,
            spill_cols: (cols % tile_cols as u64) as u32,
            spill_rows: (rows % tile_rows as u64) as u32,
            tile_len,
            tile_size_bytes,
            total_segments,
            fast_address,
            fast_seek,
            row_shift: tile_rows.trailing_zeros(),
            col_shift: tile_cols.trailing_zeros(),
            row_mask: tile_rows as u64 - 1,
            col_mask: tile_cols as u64 - 1,
            tile_shift: tile_size_bytes.trailing_zeros(),
            element_shift: element_size.trailing_zeros(),
        })
    }

    /// 从文件头构造
    pub fn from_header(header: &SegmentHeader) -> Result<Self> {
        Self::new(
            header.rows,
            header.cols,
            header.tile_rows,
            header.tile_cols,
            header.element_size,
        )
    }

    /// 段文件的完整大小（文件头 + 所有段）
    pub fn file_size(&self) -> u64 {
        HEADER_SIZE + self.total_segments * self.tile_size_bytes
    }

    /// 每段字节数（usize）
    pub fn tile_bytes(&self) -> usize {
        self.tile_size_bytes as usize
    }

    /// 每个元素字节数（usize）
    pub fn elem_bytes(&self) -> usize {
        self.element_size as usize
    }
}

/// 段缓存运行参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOptions {
    /// 内存中同时驻留的段数量
    pub pool_size: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl SegmentOptions {
    /// 指定槽位数量
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self { pool_size }
    }
}
