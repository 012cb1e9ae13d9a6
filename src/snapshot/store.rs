//! Snapshot file access.
//!
//! Stateless: the path is the only handle, every call goes to disk. Writes
//! go to a sibling `.tmp` file that is renamed over the target, so a
//! polling reader sees either the old or the new document, never a torn
//! one. Concurrent writers are not serialized (last rename wins).

use super::Snapshot;
use super::document::{parse_document, render_document};
use crate::error::{Error, Result};
use crate::types::Vector3;
use log::{debug, error};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Replace the document at `path` with `sample` and `socket_port`.
pub fn write(path: &Path, sample: Vector3, socket_port: u16) -> Result<()> {
    let snapshot = Snapshot::new(sample, socket_port);
    let document = render_document(&snapshot);

    if let Err(e) = replace_file(path, document.as_bytes()) {
        error!("Failed to write snapshot {}: {}", path.display(), e);
        return Err(Error::storage(path, e));
    }

    debug!("Wrote snapshot {} to {}", snapshot, path.display());
    Ok(())
}

/// Read the document at `path`.
///
/// I/O failures are [`Error::Storage`]; anything wrong with the content is
/// [`Error::Parse`].
pub fn read(path: &Path) -> Result<Snapshot> {
    let bytes = fs::read(path).map_err(|e| {
        error!("Failed to read snapshot {}: {}", path.display(), e);
        Error::storage(path, e)
    })?;

    let parsed = std::str::from_utf8(&bytes)
        .map_err(|e| format!("not UTF-8: {}", e))
        .and_then(parse_document);

    parsed.map_err(|reason| {
        error!("Failed to parse snapshot {}: {}", path.display(), reason);
        Error::parse(path, reason)
    })
}

fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path)?;
    let result = write_and_rename(&tmp, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_and_rename(tmp: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(contents)?;
    file.sync_all()?;

    // Keep the mode of the file being replaced (the target app must still
    // be able to read it)
    if let Ok(meta) = fs::metadata(path) {
        file.set_permissions(meta.permissions())?;
    }
    drop(file);

    fs::rename(tmp, path)
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "snapshot path has no file name")
    })?;
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gyro_settings.xml");

        write(&path, Vector3::new(1.0, 2.5, -3.25), 16384).unwrap();
        let snapshot = read(&path).unwrap();

        assert_eq!(snapshot.vector, Vector3::new(1.0, 2.5, -3.25));
        assert_eq!(snapshot.socket_port, 16384);
        assert!(!dir.path().join("gyro_settings.xml.tmp").exists());
    }

    #[test]
    fn test_overwrite_is_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gyro_settings.xml");
        fs::write(&path, "x".repeat(4096)).unwrap();

        write(&path, Vector3::new(0.1, 0.2, 0.3), 5555).unwrap();
        write(&path, Vector3::new(-7.0, 8.123456789, 9.5), 6000).unwrap();

        let snapshot = read(&path).unwrap();
        assert_abs_diff_eq!(snapshot.vector.x, -7.0, epsilon = 1e-6);
        assert_abs_diff_eq!(snapshot.vector.y, 8.123456789, epsilon = 1e-6);
        assert_abs_diff_eq!(snapshot.vector.z, 9.5, epsilon = 1e-6);
        assert_eq!(snapshot.socket_port, 6000);
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("gyro_settings.xml");
        let result = write(&path, Vector3::default(), 16384);
        assert!(matches!(result, Err(Error::Storage { .. })));
    }

    #[test]
    fn test_write_without_file_name() {
        let result = write(Path::new("/"), Vector3::default(), 16384);
        assert!(matches!(result, Err(Error::Storage { .. })));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read(&dir.path().join("absent.xml"));
        assert!(matches!(result, Err(Error::Storage { .. })));
    }

    #[test]
    fn test_read_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xml");

        fs::write(&path, "<map><float name=\"x\" value=\"1\" /></map>").unwrap();
        assert!(matches!(read(&path), Err(Error::Parse { .. })));

        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read(&path), Err(Error::Parse { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gyro_settings.xml");
        write(&path, Vector3::default(), 16384).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();

        write(&path, Vector3::new(1.0, 1.0, 1.0), 16384).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o664);
    }
}
