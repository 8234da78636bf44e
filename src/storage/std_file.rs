//! `std::fs::File` 存储后端

use super::SegmentStorage;
use crate::error::Result;
use std::fs::File;
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom, Write};

impl SegmentStorage for File {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        let mut done = 0;
        while done < buf.len() {
            match self.read(&mut buf[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(done)
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn size(&self) -> Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        self.set_len(size)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Write::flush(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(std::format!("segment_core_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_file_read_write() {
        let path = temp_path("std_file_rw");
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();

        SegmentStorage::set_size(&mut file, 16).unwrap();
        assert_eq!(SegmentStorage::size(&file).unwrap(), 16);

        assert_eq!(SegmentStorage::write_at(&mut file, 10, b"abc").unwrap(), 3);
        let mut buf = [0u8; 8];
        assert_eq!(SegmentStorage::read_at(&mut file, 8, &mut buf).unwrap(), 8);
        assert_eq!(&buf[2..5], b"abc");

        // 读到文件末尾返回实际字节数
        assert_eq!(SegmentStorage::read_at(&mut file, 12, &mut buf).unwrap(), 4);
        SegmentStorage::flush(&mut file).unwrap();

        drop(file);
        std::fs::remove_file(&path).unwrap();
    }
}
