//! 段缓存公共接口
//!
//! [`Segment`] 拥有段文件、槽位池、年龄队列和段索引，
//! 对外提供按元素和按行的读写。

use super::{
    age_queue::AgeQueue,
    index::SegmentIndex,
    slot::{Slot, SlotId},
};
use crate::{
    error::{Error, ErrorKind, Result},
    header::{format, read_header},
    storage::{SegmentFile, SegmentStorage},
    types::{SegmentConfig, SegmentOptions},
};
use alloc::vec::Vec;

/// 缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 段解析总次数
    pub accesses: u64,
    /// 命中次数（段已驻留）
    pub hits: u64,
    /// 未命中次数
    pub misses: u64,
    /// 从磁盘读入段的次数
    pub loads: u64,
    /// 驱逐次数
    pub evictions: u64,
    /// 脏段写回次数
    pub writebacks: u64,
    /// 行直写的段数
    pub row_writes: u64,
}

impl CacheStats {
    /// 计算命中率
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }
}

/// 段缓存
///
/// 把一个远大于内存的矩阵按段映射到磁盘文件上，内存中最多同时驻留
/// `pool_size` 个段，按最近最少使用（LRU）驱逐，脏段在驱逐时写回。
///
/// # 生命周期
///
/// 1. 用 [`format`](crate::format) 格式化存储
/// 2. [`Segment::init`] 读入文件头并分配槽位
/// 3. [`get`](Self::get) / [`put`](Self::put) / [`get_row`](Self::get_row) / [`put_row`](Self::put_row)
/// 4. [`release`](Self::release) 写回所有脏段并取回存储
///
/// 不调用 `release` 直接丢弃会丢失尚未写回的数据。
///
/// # 并发使用
///
/// 单线程设计。多线程环境下应把整个 `Segment` 放在一把锁里：
///
/// ```rust,ignore
/// let seg = Arc::new(Mutex::new(Segment::init(file, SegmentOptions::default())?));
/// ```
pub struct Segment<S: SegmentStorage> {
    /// 段文件
    pub(super) file: SegmentFile<S>,
    /// 槽位池
    pub(super) slots: Vec<Slot>,
    /// 空槽位
    pub(super) free_slots: Vec<SlotId>,
    /// 年龄队列
    pub(super) age: AgeQueue,
    /// 段号 → 槽位
    pub(super) index: SegmentIndex,
    /// 最近一次访问的槽位
    pub(super) current: Option<SlotId>,
    /// 统计信息
    pub(super) stats: CacheStats,
}

impl<S: SegmentStorage> Segment<S> {
    /// 在已格式化的存储上初始化缓存
    ///
    /// 槽位数会被限制在 `[1, 段总数]` 内。
    ///
    /// # 错误
    ///
    /// - 文件头无效或文件被截断返回 `Corrupted`
    /// - `pool_size` 为 0 返回 `InvalidInput`
    /// - 缓冲区分配失败返回 `NoMemory`
    pub fn init(mut storage: S, options: SegmentOptions) -> Result<Self> {
        let config = read_header(&mut storage)?;
        Self::with_config(storage, config, options)
    }

    /// 格式化存储并初始化缓存
    pub fn create(
        mut storage: S,
        rows: u64,
        cols: u64,
        tile_rows: u32,
        tile_cols: u32,
        element_size: u32,
        options: SegmentOptions,
    ) -> Result<Self> {
        let config = format(&mut storage, rows, cols, tile_rows, tile_cols, element_size)?;
        Self::with_config(storage, config, options)
    }

    pub(crate) fn with_config(storage: S, config: SegmentConfig, options: SegmentOptions) -> Result<Self> {
        if options.pool_size == 0 {
            return Err(Error::new(ErrorKind::InvalidInput, "Pool size must be positive"));
        }
        let pool_size = if options.pool_size as u64 > config.total_segments {
            log::warn!(
                "[SEGMENT] pool size {} exceeds {} segments, clamped",
                options.pool_size,
                config.total_segments
            );
            config.total_segments as usize
        } else {
            options.pool_size
        };

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(pool_size)
            .map_err(|_| Error::new(ErrorKind::NoMemory, "Cannot allocate slot pool"))?;
        for _ in 0..pool_size {
            slots.push(Slot::new(config.tile_bytes())?);
        }
        let free_slots = (0..pool_size).rev().collect();

        log::info!(
            "[SEGMENT] init {}x{} matrix, {} slots of {} bytes (fast_address={}, fast_seek={})",
            config.rows,
            config.cols,
            pool_size,
            config.tile_size_bytes,
            config.fast_address,
            config.fast_seek
        );

        Ok(Self {
            file: SegmentFile::new(storage, config),
            slots,
            free_slots,
            age: AgeQueue::with_capacity(pool_size)?,
            index: SegmentIndex::new(),
            current: None,
            stats: CacheStats::default(),
        })
    }

    /// 几何参数
    pub fn config(&self) -> &SegmentConfig {
        self.file.config()
    }

    /// 槽位数量
    pub fn pool_size(&self) -> usize {
        self.slots.len()
    }

    /// 驻留段数量
    pub fn resident(&self) -> usize {
        self.index.len()
    }

    /// 段是否驻留
    pub fn is_resident(&self, segment: u64) -> bool {
        self.index.contains(segment)
    }

    /// 脏槽位数量
    pub fn dirty_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_dirty()).count()
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// 底层存储的引用
    pub fn storage(&self) -> &S {
        self.file.storage()
    }

    /// 底层存储的可变引用
    ///
    /// 绕过缓存直接修改存储会使驻留段与磁盘不一致。
    pub fn storage_mut(&mut self) -> &mut S {
        self.file.storage_mut()
    }

    /// 读取一个元素
    ///
    /// `out` 长度必须等于元素大小。
    pub fn get(&mut self, row: u64, col: u64, out: &mut [u8]) -> Result<()> {
        let element_size = self.check_element(out.len())?;
        self.config().check_bounds(row, col)?;
        let (segment, offset) = self.config().address(row, col);
        let slot = self.resolve(segment)?;
        out.copy_from_slice(self.slots[slot].element(offset as usize, element_size));
        Ok(())
    }

    /// 写入一个元素
    ///
    /// 新值立即对之后的 `get` 可见，段被驱逐或 `flush` 时写回磁盘。
    pub fn put(&mut self, row: u64, col: u64, value: &[u8]) -> Result<()> {
        let element_size = self.check_element(value.len())?;
        self.config().check_bounds(row, col)?;
        let (segment, offset) = self.config().address(row, col);
        let slot = self.resolve(segment)?;
        let slot = &mut self.slots[slot];
        slot.element_mut(offset as usize, element_size).copy_from_slice(value);
        slot.mark_dirty();
        Ok(())
    }

    /// 从 `(row, col_start)` 开始读取连续元素，直到填满 `buf`
    ///
    /// 跨越的每个段各解析一次。
    pub fn get_row(&mut self, row: u64, col_start: u64, buf: &mut [u8]) -> Result<()> {
        self.check_span(row, col_start, buf.len())?;
        let element_size = self.config().elem_bytes();

        let mut col = col_start;
        let mut pos = 0;
        while pos < buf.len() {
            let (segment, offset) = self.config().address(row, col);
            let take = self.span_len(col, buf.len() - pos);
            let slot = self.resolve(segment)?;

            let start = offset as usize * element_size;
            let len = take as usize * element_size;
            buf[pos..pos + len].copy_from_slice(&self.slots[slot].data[start..start + len]);

            col += take;
            pos += len;
        }
        Ok(())
    }

    /// 从 `(row, col_start)` 开始写入 `buf` 中的连续元素
    ///
    /// 每个跨越的段直接写一次磁盘，不经过槽位池。驻留副本同步处理：
    /// 整段被覆盖时直接丢弃（不写回），部分覆盖时把新数据补进缓冲区。
    pub fn put_row(&mut self, row: u64, col_start: u64, buf: &[u8]) -> Result<()> {
        self.check_span(row, col_start, buf.len())?;
        let element_size = self.config().elem_bytes();
        let whole_tile_rows = self.config().tile_rows == 1;
        let tile_cols = self.config().tile_cols as u64;

        let mut col = col_start;
        let mut pos = 0;
        while pos < buf.len() {
            let (segment, offset) = self.config().address(row, col);
            let take = self.span_len(col, buf.len() - pos);
            let len = take as usize * element_size;
            let data = &buf[pos..pos + len];

            self.file.write_span(segment, offset, data)?;
            self.stats.row_writes += 1;

            if let Some(slot) = self.index.find(segment) {
                if whole_tile_rows && take == tile_cols {
                    log::debug!("[SEGMENT] put_row overwrote segment {}, dropping slot {}", segment, slot);
                    self.invalidate(segment)?;
                } else {
                    let start = offset as usize * element_size;
                    self.slots[slot].data[start..start + len].copy_from_slice(data);
                }
            }

            col += take;
            pos += len;
        }
        Ok(())
    }

    /// 把所有脏段写回磁盘，不驱逐
    ///
    /// # 返回
    ///
    /// 写回的段数量
    pub fn flush(&mut self) -> Result<usize> {
        let mut count = 0;
        for slot in 0..self.slots.len() {
            if self.slots[slot].is_dirty() {
                self.write_back(slot)?;
                count += 1;
            }
        }
        log::debug!("[SEGMENT] flushed {} dirty segments", count);
        Ok(count)
    }

    /// 写回所有脏段，释放槽位并取回存储
    pub fn release(mut self) -> Result<S> {
        let flushed = self.flush()?;
        self.check_consistency()?;
        self.file.sync()?;
        log::info!(
            "[SEGMENT] release: {} flushed, {} loads, {} evictions, hit rate {:.2}",
            flushed,
            self.stats.loads,
            self.stats.evictions,
            self.stats.hit_rate()
        );
        Ok(self.file.into_storage())
    }

    fn check_element(&self, len: usize) -> Result<usize> {
        let element_size = self.config().elem_bytes();
        if len != element_size {
            return Err(Error::new(ErrorKind::InvalidInput, "Buffer size does not match element size"));
        }
        Ok(element_size)
    }

    fn check_span(&self, row: u64, col_start: u64, len: usize) -> Result<()> {
        let config = self.config();
        let element_size = config.elem_bytes();
        if len == 0 || len % element_size != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Row buffer must be a non-empty multiple of element size",
            ));
        }
        config.check_bounds(row, col_start)?;
        let ncols = (len / element_size) as u64;
        if ncols > config.cols - col_start {
            log::warn!(
                "[SEGMENT] row span {}+{} exceeds {} cols",
                col_start,
                ncols,
                config.cols
            );
            return Err(Error::new(ErrorKind::OutOfBounds, "Row span exceeds matrix width"));
        }
        Ok(())
    }

    /// 当前段内本次可以处理的列数
    fn span_len(&self, col: u64, remaining_bytes: usize) -> u64 {
        let remaining = (remaining_bytes / self.config().elem_bytes()) as u64;
        self.config().cols_left_in_tile(col).min(remaining)
    }
}

impl<S: SegmentStorage> core::fmt::Debug for Segment<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Segment")
            .field("config", self.config())
            .field("pool_size", &self.slots.len())
            .field("resident", &self.index.len())
            .field("current", &self.current)
            .field("stats", &self.stats)
            .finish()
    }
}
