//! Shared test utilities for integration tests.
//!
//! Fixture archives are written with `zip::ZipWriter` into a temporary
//! workspace. Entries are stored uncompressed.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

/// One entry of a fixture archive.
pub enum Entry<'a> {
    /// A file entry with its data.
    File(&'a str, &'a [u8]),
    /// A directory entry.
    Dir(&'a str),
}

/// A temporary directory holding fixture archives, loose files and output.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Returns the workspace root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns a path below the workspace root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Writes a ZIP archive with text file entries only.
    pub fn zip(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let entries: Vec<Entry<'_>> = files
            .iter()
            .map(|&(name, data)| Entry::File(name, data.as_bytes()))
            .collect();
        self.zip_entries(name, &entries)
    }

    /// Writes a ZIP archive with the given entries in order.
    pub fn zip_entries(&self, name: &str, entries: &[Entry<'_>]) -> PathBuf {
        let zip_path = self.path(name);
        if let Some(parent) = zip_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for entry in entries {
            match entry {
                Entry::File(entry_name, content) => {
                    writer.start_file(entry_name.to_string(), options).unwrap();
                    writer.write_all(content).unwrap();
                }
                Entry::Dir(entry_name) => {
                    writer
                        .add_directory(entry_name.to_string(), options)
                        .unwrap();
                }
            }
        }
        writer.finish().unwrap();
        zip_path
    }

    /// Writes a loose file, creating parent directories.
    pub fn file(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

/// Lists every regular file below `root` with its content, keyed by the
/// `/`-separated relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let data = fs::read(entry.path()).unwrap();
            (rel, data)
        })
        .collect()
}

/// Lists the relative paths of every regular file below `root`.
pub fn file_names(root: &Path) -> Vec<String> {
    read_tree(root).into_keys().collect()
}
