//! Writing into the output directory.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::error::{FileOperation, IoResultExt};
use crate::{EntryPath, Error, READ_BUFFER_SIZE, Result};

/// What writing one file did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Written {
    /// Bytes written.
    pub bytes: u64,
    /// Whether an earlier layer had already written this path.
    pub overwritten: bool,
}

/// The output directory of a patch run.
///
/// Tracks the files written so far so later layers can report overwrites.
pub(crate) struct OutputDir<'a> {
    root: &'a Path,
    written: HashSet<EntryPath>,
    buffer: Vec<u8>,
}

impl<'a> OutputDir<'a> {
    /// Wraps an existing, empty directory.
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            written: HashSet::new(),
            buffer: vec![0u8; READ_BUFFER_SIZE],
        }
    }

    /// Creates a directory (and its parents) below the root.
    pub fn create_dir(&mut self, path: &EntryPath) -> Result<()> {
        let dest = path.resolve(self.root);
        fs::create_dir_all(&dest).with_path(FileOperation::Create, &dest)
    }

    /// Streams `reader` into a file below the root, replacing any earlier file.
    ///
    /// `source` names where the data comes from and is reported on read errors.
    pub fn write_file(
        &mut self,
        path: &EntryPath,
        reader: &mut dyn Read,
        source: &Path,
    ) -> Result<Written> {
        let dest = path.resolve(self.root);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_path(FileOperation::Create, parent)?;
        }

        let file = File::create(&dest).with_path(FileOperation::Create, &dest)?;
        let mut writer = BufWriter::with_capacity(READ_BUFFER_SIZE, file);
        let mut bytes = 0u64;
        loop {
            let n = match reader.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::file(FileOperation::Read, source, e));
                }
            };
            writer
                .write_all(&self.buffer[..n])
                .with_path(FileOperation::Write, &dest)?;
            bytes += n as u64;
        }
        writer.flush().with_path(FileOperation::Write, &dest)?;

        let overwritten = !self.written.insert(path.clone());
        if overwritten {
            log::trace!("Overwrote {}", path);
        }
        Ok(Written { bytes, overwritten })
    }

    /// Copies a file from disk to a path below the root.
    pub fn copy_file(&mut self, source: &Path, path: &EntryPath) -> Result<Written> {
        let mut file = File::open(source).with_path(FileOperation::Open, source)?;
        self.write_file(path, &mut file, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn entry(path: &str) -> EntryPath {
        EntryPath::parse(path).unwrap()
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let mut out = OutputDir::new(dir.path());
        let written = out
            .write_file(
                &entry("a/b/c.txt"),
                &mut Cursor::new(b"hello".to_vec()),
                Path::new("src"),
            )
            .unwrap();

        assert_eq!(written.bytes, 5);
        assert!(!written.overwritten);
        assert_eq!(fs::read(dir.path().join("a/b/c.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_second_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut out = OutputDir::new(dir.path());
        out.write_file(
            &entry("x.txt"),
            &mut Cursor::new(b"first, longer".to_vec()),
            Path::new("a"),
        )
        .unwrap();
        let written = out
            .write_file(&entry("x.txt"), &mut Cursor::new(b"second".to_vec()), Path::new("b"))
            .unwrap();

        assert!(written.overwritten);
        assert_eq!(fs::read(dir.path().join("x.txt")).unwrap(), b"second");
    }

    #[test]
    fn test_large_file_spans_buffers() {
        let dir = TempDir::new().unwrap();
        let mut out = OutputDir::new(dir.path());
        let data: Vec<u8> = (0..READ_BUFFER_SIZE * 3 + 17).map(|i| i as u8).collect();
        let written = out
            .write_file(&entry("big.bin"), &mut Cursor::new(data.clone()), Path::new("s"))
            .unwrap();
        assert_eq!(written.bytes, data.len() as u64);
        assert_eq!(fs::read(dir.path().join("big.bin")).unwrap(), data);
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = TempDir::new().unwrap();
        let mut out = OutputDir::new(dir.path());
        let err = out
            .copy_file(&dir.path().join("missing.txt"), &entry("m.txt"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::File {
                operation: FileOperation::Open,
                ..
            }
        ));
    }

    #[test]
    fn test_create_dir() {
        let dir = TempDir::new().unwrap();
        let mut out = OutputDir::new(dir.path());
        out.create_dir(&entry("META-INF/services")).unwrap();
        assert!(dir.path().join("META-INF/services").is_dir());
    }
}
