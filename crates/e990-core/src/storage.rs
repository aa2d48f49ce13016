//! Local artifact lifecycle.
//!
//! Bodies are written to `<name>.part` and renamed into place only once they
//! are known to be archives, so an HTML page never replaces a good local copy.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Number of leading lines inspected when sniffing content.
pub const SNIFF_LINES: usize = 10;

/// Byte cap for sniffing, so a binary body without newlines stays bounded.
pub const SNIFF_MAX_BYTES: usize = 8 * 1024;

/// Path for the temp file: appends `.part` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Create the destination directory (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create destination directory {}", dir.display()))
}

/// Atomically rename the temp file to the final path.
pub fn finalize(temp: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp, final_path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            temp.display(),
            final_path.display()
        )
    })
}

/// Remove a file; a file that is already gone is not an error.
pub fn discard(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}

/// Read the head of a file: up to `max_lines` newline-terminated lines, never
/// more than `max_bytes`.
pub fn read_leading(path: &Path, max_lines: usize, max_bytes: usize) -> Result<Vec<u8>> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = Vec::with_capacity(max_bytes.min(4096));
    f.by_ref()
        .take(max_bytes as u64)
        .read_to_end(&mut buf)
        .with_context(|| format!("read {}", path.display()))?;

    let mut lines = 0;
    for (i, b) in buf.iter().enumerate() {
        if *b == b'\n' {
            lines += 1;
            if lines == max_lines {
                buf.truncate(i + 1);
                break;
            }
        }
    }
    Ok(buf)
}

/// Leading bytes with the default sniff limits.
pub fn sniff(path: &Path) -> Result<Vec<u8>> {
    read_leading(path, SNIFF_LINES, SNIFF_MAX_BYTES)
}

/// Modification time of an existing file as Unix seconds; `None` if the file is absent.
pub fn modified_unix(path: &Path) -> Result<Option<i64>> {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("stat {}", path.display())),
    };
    if !meta.is_file() {
        return Ok(None);
    }
    let mtime = meta
        .modified()
        .with_context(|| format!("mtime {}", path.display()))?;
    let secs = match mtime.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    };
    Ok(Some(secs))
}

/// Set a file's modification time (used to mirror the server's `Last-Modified`).
pub fn set_modified_unix(path: &Path, secs: i64) -> io::Result<()> {
    let when = if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    };
    let f = File::options().write(true).open(path)?;
    f.set_modified(when)
}

/// Size of a file in bytes.
pub fn file_len(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len())
}

/// Current time as Unix seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("/data/raw/download990xml_2020_1.zip"));
        assert_eq!(p.to_string_lossy(), "/data/raw/download990xml_2020_1.zip.part");
    }

    #[test]
    fn read_leading_stops_after_line_limit() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("page.html");
        let body: String = (0..20).map(|i| format!("line {}\n", i)).collect();
        fs::write(&p, body).unwrap();
        let head = read_leading(&p, 3, 1024).unwrap();
        assert_eq!(head, b"line 0\nline 1\nline 2\n");
    }

    #[test]
    fn read_leading_caps_bytes_without_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("blob.zip");
        fs::write(&p, vec![0xAAu8; 10_000]).unwrap();
        let head = read_leading(&p, SNIFF_LINES, 512).unwrap();
        assert_eq!(head.len(), 512);
    }

    #[test]
    fn discard_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        discard(&dir.path().join("nope.zip")).unwrap();
    }

    #[test]
    fn finalize_renames_temp() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("a.zip");
        let tp = temp_path(&final_path);
        fs::write(&tp, b"PK").unwrap();
        finalize(&tp, &final_path).unwrap();
        assert!(!tp.exists());
        assert_eq!(fs::read(&final_path).unwrap(), b"PK");
    }

    #[test]
    fn modified_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.zip");
        assert_eq!(modified_unix(&p).unwrap(), None);
        fs::write(&p, b"PK").unwrap();
        set_modified_unix(&p, 1_600_000_000).unwrap();
        assert_eq!(modified_unix(&p).unwrap(), Some(1_600_000_000));
    }
}
