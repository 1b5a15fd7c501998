//! Idempotent output writing
//!
//! Downstream incremental build steps key on modification times, so a
//! destination file is only rewritten when its content actually changed:
//! content within the in-memory comparison bound is compared byte-for-byte
//! against the existing file and the write is skipped when identical.
//! Content exceeding the bound is written unconditionally and the skipped
//! comparison is logged.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::error::Result;

/// Write `content` to `dest` unless the file already holds exactly those
/// bytes. Returns `true` when the file was written.
pub fn write_if_differs(dest: &Path, content: &[u8], threshold: usize) -> Result<bool> {
    if content.len() > threshold {
        info!(
            "File {} was overwritten due to content limit threshold {} reached",
            dest.display(),
            threshold
        );
        fs::write(dest, content)?;
        return Ok(true);
    }

    if dest.exists() {
        let existing = fs::read(dest)?;
        if existing == content {
            debug!("File {} is up to date", dest.display());
            return Ok(false);
        }
        debug!("File {} contents differ", dest.display());
    }

    debug!("Writing {}", dest.display());
    fs::write(dest, content)?;
    Ok(true)
}

/// Append raw bytes to an existing destination file, creating it when the
/// base steps produced nothing.
pub fn append_bytes(dest: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::OpenOptions::new().create(true).append(true).open(dest)?;
    file.write_all(content)?;
    Ok(())
}

/// Name of the marker file recording the output directory for downstream
/// packaging steps.
pub const OUTPUT_MARKER: &str = ".resources-dir";

/// Record the output directory name in the build directory's marker file.
pub fn write_marker(build_dir: &Path, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(build_dir)?;
    let name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output_dir.display().to_string());
    fs::write(build_dir.join(OUTPUT_MARKER), name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_write_if_differs_creates_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");

        assert!(write_if_differs(&dest, b"content", 1024).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"content");
    }

    #[test]
    fn test_write_if_differs_skips_identical_content() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");

        assert!(write_if_differs(&dest, b"content", 1024).unwrap());
        let mtime = fs::metadata(&dest).unwrap().modified().unwrap();

        std::thread::sleep(Duration::from_millis(20));
        assert!(!write_if_differs(&dest, b"content", 1024).unwrap());
        assert_eq!(fs::metadata(&dest).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn test_write_if_differs_rewrites_changed_content() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");

        write_if_differs(&dest, b"old", 1024).unwrap();
        assert!(write_if_differs(&dest, b"new", 1024).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_write_above_threshold_is_unconditional() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");
        let content = vec![b'x'; 32];

        write_if_differs(&dest, &content, 8).unwrap();
        // identical content still rewrites when it exceeds the bound
        assert!(write_if_differs(&dest, &content, 8).unwrap());
    }

    #[test]
    fn test_append_bytes() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.txt");

        fs::write(&dest, b"base\n").unwrap();
        append_bytes(&dest, b"appendix\n").unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"base\nappendix\n");
    }

    #[test]
    fn test_write_marker_records_directory_name() {
        let dir = TempDir::new().unwrap();
        let build_dir = dir.path().join("target");
        let output_dir = build_dir.join("remote-resources");

        write_marker(&build_dir, &output_dir).unwrap();
        let marker = fs::read_to_string(build_dir.join(OUTPUT_MARKER)).unwrap();
        assert_eq!(marker, "remote-resources");
    }
}
