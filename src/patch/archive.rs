//! Scoped access to source archives.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{FileOperation, IoResultExt};
use crate::{EntryPath, Error, Result};

/// One entry as handed to a visitor.
pub(crate) struct ArchiveEntry<'a> {
    /// The name as stored in the archive.
    pub name: &'a str,
    /// The normalized path, `None` if the name is unsafe.
    pub path: Option<EntryPath>,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// The entry data (empty for directories).
    pub reader: &'a mut dyn Read,
}

/// Returns the validated path of an entry, or an error naming the archive.
pub(crate) fn require_path<'p>(
    path: &'p Option<EntryPath>,
    name: &str,
    archive: &Path,
) -> Result<&'p EntryPath> {
    path.as_ref().ok_or_else(|| Error::UnsafeEntryPath {
        archive: archive.to_path_buf(),
        entry: name.to_string(),
    })
}

/// An open ZIP archive.
///
/// The file handle is owned and released on drop, so an archive is closed on
/// every path out of the phase that opened it.
pub(crate) struct SourceArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl SourceArchive {
    /// Opens and indexes the archive at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_path(FileOperation::Open, path)?;
        let zip = ZipArchive::new(BufReader::new(file)).map_err(|e| Error::from_zip(path, e))?;
        log::debug!("Opened {} ({} entries)", path.display(), zip.len());
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Returns the archive path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    /// Visits every entry in central directory order.
    ///
    /// Entries naming the archive root itself (`/`, `./`) carry nothing and
    /// are skipped.
    pub fn for_each_entry<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(ArchiveEntry<'_>) -> Result<()>,
    {
        for index in 0..self.zip.len() {
            let mut file = self
                .zip
                .by_index(index)
                .map_err(|e| Error::from_zip(&self.path, e))?;
            let name = file.name().to_string();
            if is_root_name(&name) {
                continue;
            }
            let is_dir = file.is_dir();
            visit(ArchiveEntry {
                path: EntryPath::parse(&name),
                name: &name,
                is_dir,
                reader: &mut file,
            })?;
        }
        Ok(())
    }
}

fn is_root_name(name: &str) -> bool {
    name.split(['/', '\\']).all(|s| s.is_empty() || s == ".")
}
