//! Best-effort storage introspection.
//!
//! Reports how many bytes the library occupies and how much the backing
//! filesystem offers. This capability may be unavailable (non-Unix,
//! missing files); that is never an error — callers get `None`.

use std::path::Path;

/// Used/total bytes for the library's storage.
#[derive(Debug, Clone, Copy)]
pub struct StorageEstimate {
    /// Bytes occupied by the database files.
    pub used_bytes: u64,
    /// Capacity of the filesystem holding the database.
    pub total_bytes: u64,
    /// `used_bytes` over `total_bytes`, in `[0, 1]`.
    pub usage_fraction: f64,
}

/// Estimate storage for the database at `db_path`.
///
/// `payload_bytes` stands in for the on-disk size when the database file
/// cannot be measured (e.g. an in-memory pool).
pub fn storage_estimate(db_path: &Path, payload_bytes: u64) -> Option<StorageEstimate> {
    let used_bytes = database_file_bytes(db_path).max(payload_bytes);
    let total_bytes = filesystem_total_bytes(db_path)?;
    if total_bytes == 0 {
        return None;
    }
    Some(StorageEstimate {
        used_bytes,
        total_bytes,
        usage_fraction: used_bytes as f64 / total_bytes as f64,
    })
}

/// Sum the sizes of the database file and its WAL/shared-memory sidecars.
fn database_file_bytes(db_path: &Path) -> u64 {
    let mut total = file_size(db_path);
    for suffix in ["-wal", "-shm"] {
        let mut sidecar = db_path.as_os_str().to_os_string();
        sidecar.push(suffix);
        total += file_size(Path::new(&sidecar));
    }
    total
}

fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Capacity of the filesystem holding `path`, via `statvfs`.
#[cfg(unix)]
fn filesystem_total_bytes(path: &Path) -> Option<u64> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let probe = dir.unwrap_or_else(|| Path::new("."));
    let c_path = CString::new(probe.as_os_str().as_bytes()).ok()?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // Safety: statvfs is well-defined for a valid, NUL-terminated path.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    let stat = unsafe { stat.assume_init() };
    Some(stat.f_blocks as u64 * stat.f_frsize as u64)
}

#[cfg(not(unix))]
fn filesystem_total_bytes(_path: &Path) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_count_as_zero() {
        assert_eq!(database_file_bytes(Path::new("/nonexistent/library.db")), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_estimate_for_current_directory() {
        let estimate = storage_estimate(Path::new("./coursehub-test.db"), 0)
            .expect("statvfs should succeed for the working directory");
        assert!(estimate.total_bytes > 0);
        assert!(estimate.usage_fraction >= 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_payload_bytes_floor_the_estimate() {
        let estimate = storage_estimate(Path::new("./coursehub-test.db"), 4096)
            .expect("statvfs should succeed for the working directory");
        assert!(estimate.used_bytes >= 4096);
    }
}
