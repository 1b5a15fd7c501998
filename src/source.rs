//! # Bundle Resource Sources
//!
//! A resolved bundle artifact is either a packaged archive or a directory
//! (the output directory of a sibling build unit). [`ResourceSource`]
//! abstracts both behind one byte-addressable lookup so the rest of the
//! pipeline never cares which form a bundle arrived in.
//!
//! Lookup is scoped strictly to the opened source: a missing entry returns
//! `None`, it never falls back to any ambient search path. This keeps
//! resolution reproducible regardless of the invoking environment.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A byte-addressable source of bundle resources.
#[derive(Debug)]
pub enum ResourceSource {
    /// An unpacked bundle: resources are files under a root directory.
    Directory(PathBuf),
    /// A packaged bundle: resources are entries of a zip archive.
    Archive(PathBuf),
}

impl ResourceSource {
    /// Open a resolved artifact path as a resource source.
    pub fn open(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Ok(Self::Directory(path.to_path_buf()))
        } else if path.is_file() {
            Ok(Self::Archive(path.to_path_buf()))
        } else {
            Err(Error::Acquisition {
                coordinates: path.display().to_string(),
                message: "resolved artifact does not exist".to_string(),
            })
        }
    }

    /// Location of the underlying artifact, for diagnostics.
    pub fn location(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }

    /// Read the bytes of a resource by its relative, `/`-separated name.
    /// Returns `Ok(None)` when the source has no such entry.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Directory(root) => {
                let path = root.join(name);
                if path.is_file() {
                    Ok(Some(fs::read(path)?))
                } else {
                    Ok(None)
                }
            }
            Self::Archive(path) => {
                let file = fs::File::open(path)?;
                let mut archive =
                    zip::ZipArchive::new(file).map_err(|e| Error::BundleRead {
                        resource: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                let result = match archive.by_name(name) {
                    Ok(mut entry) => {
                        let mut bytes = Vec::new();
                        entry.read_to_end(&mut bytes)?;
                        Ok(Some(bytes))
                    }
                    Err(zip::result::ZipError::FileNotFound) => Ok(None),
                    Err(e) => Err(Error::BundleRead {
                        resource: name.to_string(),
                        message: e.to_string(),
                    }),
                };
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_directory_source_reads_relative_names() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        fs::write(dir.path().join("META-INF/NOTICE.txt"), "notice").unwrap();

        let source = ResourceSource::open(dir.path()).unwrap();
        assert_eq!(
            source.read("META-INF/NOTICE.txt").unwrap().unwrap(),
            b"notice"
        );
        assert!(source.read("missing.txt").unwrap().is_none());
    }

    #[test]
    fn test_archive_source_reads_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("bundle.jar");
        write_archive(&archive, &[("a.txt", "alpha"), ("sub/b.txt", "beta")]);

        let source = ResourceSource::open(&archive).unwrap();
        assert_eq!(source.read("a.txt").unwrap().unwrap(), b"alpha");
        assert_eq!(source.read("sub/b.txt").unwrap().unwrap(), b"beta");
        assert!(source.read("c.txt").unwrap().is_none());
    }

    #[test]
    fn test_open_missing_artifact_fails() {
        assert!(ResourceSource::open(Path::new("/nonexistent/artifact.jar")).is_err());
    }
}
