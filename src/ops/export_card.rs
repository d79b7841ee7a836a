use crate::common::errors::ExportError;
use crate::common::fs::SafeSaver;
use crate::config::ExportConfig;
use crate::ops::{resolve_target_year, ExportOutcome, SheetOutcome};
use crate::record::{EquipmentRepository, PhotoRepository};
use crate::render::batch::BatchExporter;
use crate::render::photo::{safe_code, PhotoCompositor};
use crate::render::renderer::RenderOptions;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ExportCardParams {
    pub code: String,
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Restrict history to the base date's year.
    #[serde(default)]
    pub year_only: bool,
    #[serde(default)]
    pub base_date: Option<NaiveDate>,
    #[serde(default)]
    pub fill_machine_no: bool,
}

/// Exports one record into a single-sheet document and returns where it
/// landed.
pub fn export_card(
    config: &ExportConfig,
    equipment: &dyn EquipmentRepository,
    photos: &dyn PhotoRepository,
    params: &ExportCardParams,
) -> Result<ExportOutcome, ExportError> {
    let code = params.code.trim();
    if code.is_empty() {
        return Err(ExportError::InvalidInput(
            "equipment code is empty".to_string(),
        ));
    }

    let mut record = equipment
        .get(code)?
        .ok_or_else(|| ExportError::EquipmentNotFound(code.to_string()))?;
    let compositor = PhotoCompositor::new(config);
    record.photo_path = compositor.resolve_photo(photos.resolve(code).as_deref(), code);

    let exporter = BatchExporter::new(config);
    let mut package = exporter.load_template(params.template_path.as_deref())?;

    let opts = RenderOptions {
        target_year: resolve_target_year(params.year_only, params.base_date),
        fill_machine_no: params.fill_machine_no,
        preferred_title: None,
    };
    let records = vec![record];
    let reports = exporter.render_into(&mut package, &records, &opts, None)?;

    let output_path = params.output_path.clone().unwrap_or_else(|| {
        let stem = {
            let s = safe_code(code);
            if s.is_empty() {
                "card".to_string()
            } else {
                s
            }
        };
        config.export_dir.join(format!("{stem}_history_card.ods"))
    });

    let saver = SafeSaver::new(config.export_dir.clone());
    let saved = saver.save(&output_path, |p| package.write_to(p))?;

    Ok(ExportOutcome {
        path: saved,
        sheets: records
            .into_iter()
            .zip(reports)
            .map(|(record, report)| SheetOutcome {
                code: record.code,
                report,
            })
            .collect(),
    })
}
