//! 段文件头读取和验证

use super::checksum::verify_checksum;
use crate::{
    consts::{HEADER_SIZE, SEGMENT_VERSION},
    error::{Error, ErrorKind, Result},
    storage::{read_exact_at, SegmentStorage},
    types::{SegmentConfig, SegmentHeader},
};

/// 从存储读取段文件头（只验证能否完整读出）
pub fn read_raw_header<S: SegmentStorage>(storage: &mut S) -> Result<SegmentHeader> {
    if storage.size()? < HEADER_SIZE {
        return Err(Error::new(ErrorKind::Corrupted, "Segment file shorter than its header"));
    }
    let mut buf = [0u8; HEADER_SIZE as usize];
    read_exact_at(storage, 0, &mut buf)?;
    Ok(SegmentHeader::from_bytes(&buf))
}

/// 读取并验证段文件头
///
/// # 错误
///
/// 以下情况返回 `Corrupted`：
/// - 魔数不匹配或版本不支持
/// - 校验和不匹配
/// - 维度为 0
/// - 文件比文件头声明的大小短（被截断）
pub fn read_header<S: SegmentStorage>(storage: &mut S) -> Result<SegmentConfig> {
    let header = read_raw_header(storage)?;

    if !header.is_valid() {
        log::error!("[SEGMENT] bad magic {:02x?}", header.magic);
        return Err(Error::new(ErrorKind::Corrupted, "Invalid segment file magic number"));
    }
    if header.version != SEGMENT_VERSION {
        log::error!("[SEGMENT] unsupported version {}", header.version);
        return Err(Error::new(ErrorKind::Corrupted, "Unsupported segment file version"));
    }
    if !verify_checksum(&header) {
        log::error!("[SEGMENT] header checksum mismatch");
        return Err(Error::new(ErrorKind::Corrupted, "Segment file header checksum mismatch"));
    }

    let config = SegmentConfig::from_header(&header)
        .map_err(|_| Error::new(ErrorKind::Corrupted, "Inconsistent segment file header"))?;

    let size = storage.size()?;
    if size < config.file_size() {
        log::error!(
            "[SEGMENT] file truncated: {} bytes, expected {}",
            size,
            config.file_size()
        );
        return Err(Error::new(ErrorKind::Corrupted, "Segment file is truncated"));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        consts::{HDR_OFF_ROWS, HDR_OFF_VERSION},
        header::{checksum::set_checksum, format, format_nofill},
        storage::MemStorage,
    };

    #[test]
    fn test_read_after_format() {
        let mut mem = MemStorage::new();
        let written = format(&mut mem, 100, 100, 8, 8, 2).unwrap();
        let read = read_header(&mut mem).unwrap();
        assert_eq!(read, written);
    }

    #[test]
    fn test_empty_file() {
        let mut mem = MemStorage::new();
        assert_eq!(read_header(&mut mem).unwrap_err().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_read_failure_is_io() {
        let mut mem = MemStorage::new();
        format_nofill(&mut mem, 10, 10, 4, 4, 1).unwrap();
        mem.set_fail_reads(true);
        assert!(read_header(&mut mem).unwrap_err().is_io());
    }

    #[test]
    fn test_bad_magic() {
        let mut mem = MemStorage::new();
        format_nofill(&mut mem, 10, 10, 4, 4, 1).unwrap();
        mem.as_bytes_mut()[0] = b'X';
        assert_eq!(read_header(&mut mem).unwrap_err().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_bad_version() {
        let mut mem = MemStorage::new();
        format_nofill(&mut mem, 10, 10, 4, 4, 1).unwrap();
        mem.as_bytes_mut()[HDR_OFF_VERSION] = 9;
        assert_eq!(read_header(&mut mem).unwrap_err().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut mem = MemStorage::new();
        format_nofill(&mut mem, 10, 10, 4, 4, 1).unwrap();
        mem.as_bytes_mut()[HDR_OFF_ROWS] ^= 0x01;
        assert_eq!(read_header(&mut mem).unwrap_err().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_zero_dimension_with_valid_checksum() {
        let mut mem = MemStorage::new();
        let config = format_nofill(&mut mem, 10, 10, 4, 4, 1).unwrap();
        let mut header = SegmentHeader::new(&config);
        header.tile_cols = 0;
        set_checksum(&mut header);
        mem.as_bytes_mut()[..HEADER_SIZE as usize].copy_from_slice(&header.to_bytes());
        assert_eq!(read_header(&mut mem).unwrap_err().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_truncated_body() {
        let mut mem = MemStorage::new();
        let config = format(&mut mem, 10, 10, 4, 4, 1).unwrap();
        mem.set_size(config.file_size() - 1).unwrap();
        assert_eq!(read_header(&mut mem).unwrap_err().kind(), ErrorKind::Corrupted);
    }
}
