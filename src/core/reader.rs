//! File reader backing the `file://{path}` resource.
//!
//! Text is always decoded lossily: invalid UTF-8 sequences become U+FFFD
//! instead of failing the read. `\r\n` and lone `\r` are translated to `\n`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::SearchError;

#[derive(Debug, Clone, Default)]
pub struct FileReader {
    max_file_size: Option<u64>,
}

impl FileReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject files larger than `limit` bytes with `SearchError::TooLarge`.
    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    /// Read the whole file at `path` as text.
    pub fn read(&self, path: &str) -> Result<String, SearchError> {
        let resolved = resolve_path(path);

        let metadata = match fs::metadata(&resolved) {
            Ok(m) if m.is_file() => m,
            _ => return Err(SearchError::NotFound(resolved)),
        };

        if let Some(limit) = self.max_file_size {
            if metadata.len() > limit {
                return Err(SearchError::TooLarge {
                    path: resolved,
                    size: metadata.len(),
                    limit,
                });
            }
        }

        let bytes = fs::read(&resolved).map_err(|source| SearchError::Io {
            path: resolved.clone(),
            source,
        })?;

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                log::debug!(
                    "Replaced invalid UTF-8 sequences while reading {}",
                    resolved.display()
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        let text = translate_newlines(text);

        log::trace!("Read {} bytes from {}", text.len(), resolved.display());
        Ok(text)
    }
}

/// Universal newlines: `\r\n` and `\r` both become `\n`.
pub fn translate_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Make `path` absolute against the current directory without touching
/// symlinks, so missing files still resolve to a reportable path.
pub fn resolve_path(path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(p),
        Err(_) => p.to_path_buf(),
    }
}
