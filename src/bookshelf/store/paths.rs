//! Mapping between identity keys and filesystem paths.
//!
//! Both stores lay entries out as `<root>/<last>/<first>/<title>.<ext>`. Each
//! segment is percent-encoded only where the filesystem needs it, so directory
//! names stay readable:
//!
//! ```text
//! O'Brien / Tim / The Things They Carried.json   apostrophes and spaces kept
//! AC%2FDC / Bon / Live%3A 1979.json              separators and colons encoded
//! ```
//!
//! `%` itself is always encoded, which keeps [`decode_segment`] an exact
//! inverse of [`encode_segment`] and the key-to-path mapping injective.

use crate::error::{CatalogError, Result};
use crate::model::BookKey;
use percent_encoding::{percent_decode_str, percent_encode_byte};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_FILE_NAME_BYTES: usize = 255;

fn needs_encoding(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '%'
        )
}

/// Encodes a name or title into a single safe path segment.
///
/// ```
/// use bookshelf::store::paths::encode_segment;
///
/// assert_eq!(encode_segment("O'Brien").unwrap(), "O'Brien");
/// assert_eq!(encode_segment("AC/DC").unwrap(), "AC%2FDC");
/// assert_eq!(encode_segment("..").unwrap(), "%2E%2E");
/// assert!(encode_segment("  ").is_err());
/// ```
pub fn encode_segment(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(CatalogError::Encoding {
            segment: raw.to_string(),
            reason: "segment is blank".into(),
        });
    }
    if raw == "." || raw == ".." {
        return Ok(raw.bytes().map(percent_encode_byte).collect());
    }

    let mut encoded = String::with_capacity(raw.len());
    for c in raw.chars() {
        if needs_encoding(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                encoded.push_str(percent_encode_byte(byte));
            }
        } else {
            encoded.push(c);
        }
    }
    Ok(encoded)
}

pub fn decode_segment(encoded: &str) -> Result<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| CatalogError::Encoding {
            segment: encoded.to_string(),
            reason: e.to_string(),
        })
}

fn check_length(raw: &str, name: String) -> Result<String> {
    if name.len() > MAX_FILE_NAME_BYTES {
        return Err(CatalogError::Encoding {
            segment: raw.to_string(),
            reason: format!("file name longer than {} bytes", MAX_FILE_NAME_BYTES),
        });
    }
    Ok(name)
}

/// `<root>/<last>/<first>` for the given key.
pub fn key_dir(root: &Path, key: &BookKey) -> Result<PathBuf> {
    let last = check_length(&key.last_name, encode_segment(&key.last_name)?)?;
    let first = check_length(&key.first_name, encode_segment(&key.first_name)?)?;
    Ok(root.join(last).join(first))
}

/// `<title>.<ext>`, checked against the usual file name length limit.
pub fn entry_file_name(key: &BookKey, ext: &str) -> Result<String> {
    let name = format!("{}.{}", encode_segment(&key.title)?, ext);
    check_length(&key.title, name)
}

/// Whether both paths exist and are the same file on disk.
///
/// Distinct paths can name one file on case-insensitive filesystems or
/// through links.
pub fn same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

pub fn entry_path(root: &Path, key: &BookKey, ext: &str) -> Result<PathBuf> {
    Ok(key_dir(root, key)?.join(entry_file_name(key, ext)?))
}

/// Recovers the identity key from an entry path under `root`.
///
/// Returns `None` for paths that are not exactly three levels deep or whose
/// file name does not end in `.<ext>`.
pub fn key_from_path(root: &Path, path: &Path, ext: &str) -> Option<BookKey> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    let [last, first, file] = parts.as_slice() else {
        return None;
    };
    let title = file.strip_suffix(&format!(".{}", ext))?;
    Some(BookKey {
        last_name: decode_segment(last).ok()?,
        first_name: decode_segment(first).ok()?,
        title: decode_segment(title).ok()?,
    })
}

/// Hidden scratch file in `dir`, renamed over the target once complete.
pub fn temp_path(dir: &Path) -> PathBuf {
    dir.join(format!(".tmp-{}", Uuid::new_v4()))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(CatalogError::Io)?;
    }
    Ok(())
}

/// Removes `start` and its ancestors while they are empty, stopping at the
/// first non-empty directory or at `root` (which is never removed).
pub fn prune_empty_dirs(root: &Path, start: &Path) -> Result<()> {
    let mut current = start.to_path_buf();
    while current != root && current.starts_with(root) {
        let is_empty = fs::read_dir(&current)
            .map_err(CatalogError::Io)?
            .next()
            .is_none();
        if !is_empty {
            break;
        }
        fs::remove_dir(&current).map_err(CatalogError::Io)?;
        log::debug!("pruned empty directory {}", current.display());
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    Ok(())
}
