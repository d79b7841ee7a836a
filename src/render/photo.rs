use crate::common::errors::ExportError;
use crate::config::ExportConfig;
use image::imageops::FilterType;
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Pixel density used for the centimeter conversion. The template geometry is
/// authored against this density.
pub const EXPORT_DPI: f64 = 96.0;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "webp"];

pub fn cm_to_px(cm: f64) -> u32 {
    (cm / 2.54 * EXPORT_DPI).round().max(1.0) as u32
}

/// Resolves photo files from their many historical locations and produces
/// bitmaps resized to the exact physical slot size.
pub struct PhotoCompositor<'a> {
    config: &'a ExportConfig,
}

impl<'a> PhotoCompositor<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Candidate chain: the registered path as absolute, under the photo root,
    /// under each legacy directory (full path, then bare file name), then the
    /// first image file by name inside `{root}/{code}/` and its legacy
    /// equivalents. Absence is a normal outcome.
    pub fn resolve_photo(&self, registered: Option<&str>, code: &str) -> Option<PathBuf> {
        if let Some(rel) = registered {
            if !rel.trim().is_empty() {
                let as_path = Path::new(rel);
                if as_path.is_absolute() && as_path.is_file() {
                    return Some(as_path.to_path_buf());
                }
                let under_root = self.config.photo_root.join(rel);
                if under_root.is_file() {
                    return Some(under_root);
                }
                for dir in &self.config.legacy_photo_dirs {
                    let candidate = dir.join(rel);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                    if let Some(base) = as_path.file_name() {
                        let by_name = dir.join(base);
                        if by_name.is_file() {
                            return Some(by_name);
                        }
                    }
                }
            }
        }

        let code = safe_code(code);
        if code.is_empty() {
            return None;
        }
        let mut dirs = vec![self.config.photo_root.join(&code)];
        for legacy in &self.config.legacy_photo_dirs {
            dirs.push(legacy.join(&code));
        }
        dirs.into_iter().find_map(|dir| first_image_in(&dir))
    }

    /// Decodes and resizes to exactly the requested physical size. The stretch
    /// is deliberately non-aspect-preserving: the template slot is fixed and
    /// distortion beats cropping here. Returns PNG bytes ready for embedding.
    pub fn prepare_exact_size(
        &self,
        path: &Path,
        width_cm: f64,
        height_cm: f64,
    ) -> Result<Vec<u8>, ExportError> {
        let target_w = cm_to_px(width_cm);
        let target_h = cm_to_px(height_cm);

        let decoded = image::ImageReader::open(path)
            .map_err(|e| ExportError::InvalidInput(format!("open {}: {e}", path.display())))?
            .decode()
            .map_err(|e| ExportError::InvalidInput(format!("decode {}: {e}", path.display())))?;
        let resized = decoded.resize_exact(target_w, target_h, FilterType::Lanczos3);

        let mut buf = Cursor::new(Vec::new());
        resized
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ExportError::InvalidInput(format!("encode png: {e}")))?;
        Ok(buf.into_inner())
    }
}

/// Keeps only characters safe for a per-record directory name.
pub fn safe_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

fn first_image_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();
    files.sort();
    files.into_iter().next()
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}
