use crate::common::errors::ExportError;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persists an already-rendered document, falling back to alternate file names
/// when the requested path is locked or otherwise unwritable.
pub struct SafeSaver {
    export_dir: PathBuf,
    max_suffix_attempts: u32,
}

impl SafeSaver {
    pub fn new(export_dir: PathBuf) -> Self {
        Self {
            export_dir,
            max_suffix_attempts: 99,
        }
    }

    /// Writes via `write` to `desired`, then to `stem(n).ext` siblings, then to a
    /// timestamped name inside the export directory. Returns the path that stuck.
    pub fn save<F>(&self, desired: &Path, mut write: F) -> Result<PathBuf, ExportError>
    where
        F: FnMut(&Path) -> Result<(), ExportError>,
    {
        let mut attempt = |path: &Path| -> Result<(), ExportError> {
            Self::ensure_parent(path)?;
            write(path)
        };

        match attempt(desired) {
            Ok(()) => return Ok(desired.to_path_buf()),
            Err(err) if Self::is_retryable(&err) => {
                warn!(path = %desired.display(), error = %err, "save failed, trying alternate names");
            }
            Err(err) => return Err(err),
        }

        let stem = desired
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("export")
            .to_string();
        let ext = desired
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("ods")
            .to_string();
        let dir = desired.parent().unwrap_or_else(|| Path::new("."));

        for n in 1..=self.max_suffix_attempts {
            let candidate = dir.join(format!("{stem}({n}).{ext}"));
            if candidate.exists() {
                continue;
            }
            match attempt(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(err) if Self::is_retryable(&err) => continue,
                Err(err) => return Err(err),
            }
        }

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let fallback = self.export_dir.join(format!("{stem}_{stamp}.{ext}"));
        attempt(&fallback)?;
        Ok(fallback)
    }

    fn is_retryable(err: &ExportError) -> bool {
        matches!(err, ExportError::IoError(_) | ExportError::ZipError(_))
    }

    pub fn ensure_parent(path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
