//! 错误类型定义
//!
//! 提供段缓存操作的错误类型。

use core::fmt;

/// 段缓存操作错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: &'static str,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// I/O 错误（seek/read/write 失败或读写不完整）
    Io,
    /// 行列坐标越界
    OutOfBounds,
    /// 无效参数
    InvalidInput,
    /// 段文件损坏（文件头无效或文件被截断）
    Corrupted,
    /// 内存不足（槽位缓冲区分配失败）
    NoMemory,
    /// 内部状态不一致
    InvalidState,
}

impl Error {
    /// 创建新错误
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }

    /// 获取错误类型
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取错误消息
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// 是否是越界错误
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ErrorKind::OutOfBounds)
    }

    /// 是否是 I/O 错误
    pub const fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        log::error!("[SEGMENT] I/O error: {}", err);
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::new(ErrorKind::Io, "Unexpected end of segment file"),
            std::io::ErrorKind::OutOfMemory => Error::new(ErrorKind::NoMemory, "Out of memory during I/O"),
            _ => Error::new(ErrorKind::Io, "Segment file I/O failed"),
        }
    }
}

/// Result 类型别名
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_accessors() {
        let err = Error::new(ErrorKind::OutOfBounds, "row out of range");
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(err.message(), "row out of range");
        assert!(err.is_out_of_bounds());
        assert!(!err.is_io());
    }

    #[test]
    fn test_error_display() {
        let err = Error::new(ErrorKind::Io, "short read");
        assert_eq!(err.to_string(), "Io: short read");
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(err.is_io());
    }
}
