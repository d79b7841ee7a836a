use crate::common::errors::ExportError;
use crate::template::TemplateLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the engine needs to know about its surroundings, injected at
/// construction instead of discovered per call: where templates and photos
/// live, where exports land, and the template layout contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Candidate template directories, probed in order; first hit wins.
    pub template_dirs: Vec<PathBuf>,
    pub template_file: String,
    /// Fall back to a blank document when no template resolves.
    pub allow_blank_template: bool,
    pub photo_root: PathBuf,
    /// Older photo locations still probed after the root.
    pub legacy_photo_dirs: Vec<PathBuf>,
    pub export_dir: PathBuf,
    pub layout: TemplateLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            template_dirs: vec![PathBuf::from("templates")],
            template_file: "history_card_template.ods".to_string(),
            allow_blank_template: true,
            photo_root: PathBuf::from("photos"),
            legacy_photo_dirs: Vec::new(),
            export_dir: PathBuf::from("exports"),
            layout: TemplateLayout::default(),
        }
    }
}

impl ExportConfig {
    /// Anchors every relative directory under `root`, the usual deployment
    /// shape (templates/, photos/ and exports/ next to the application).
    pub fn with_root(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            template_dirs: vec![root.join("templates"), root.to_path_buf()],
            photo_root: root.join("photos"),
            export_dir: root.join("exports"),
            ..defaults
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ExportError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| ExportError::InvalidInput(e.to_string()))
    }
}
