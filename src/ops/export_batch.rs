use crate::common::errors::ExportError;
use crate::common::fs::SafeSaver;
use crate::config::ExportConfig;
use crate::ops::{resolve_target_year, ExportOutcome, SheetOutcome};
use crate::record::{EquipmentRepository, PhotoRepository, RecordAggregate};
use crate::render::batch::{dedup_codes, sort_records, BatchExporter, SortKey};
use crate::render::photo::PhotoCompositor;
use crate::render::renderer::RenderOptions;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ExportBatchParams {
    pub codes: Vec<String>,
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub sort_key: SortKey,
    /// Optional title pattern with `{code}` / `{name}` placeholders.
    #[serde(default)]
    pub sheet_title_format: Option<String>,
    #[serde(default)]
    pub year_only: bool,
    #[serde(default)]
    pub base_date: Option<NaiveDate>,
    #[serde(default)]
    pub fill_machine_no: bool,
}

/// Exports many records into one document, one sheet per record. An unknown
/// code fails the whole batch before anything is rendered.
pub fn export_batch(
    config: &ExportConfig,
    equipment: &dyn EquipmentRepository,
    photos: &dyn PhotoRepository,
    params: &ExportBatchParams,
) -> Result<ExportOutcome, ExportError> {
    let codes = dedup_codes(&params.codes);
    if codes.is_empty() {
        return Err(ExportError::InvalidInput(
            "no equipment codes given".to_string(),
        ));
    }

    // Materialize every aggregate first: storage access stays short and
    // rendering never touches the repositories again.
    let compositor = PhotoCompositor::new(config);
    let mut records: Vec<RecordAggregate> = Vec::with_capacity(codes.len());
    for code in &codes {
        let mut record = equipment
            .get(code)?
            .ok_or_else(|| ExportError::EquipmentNotFound(code.clone()))?;
        record.photo_path = compositor.resolve_photo(photos.resolve(code).as_deref(), code);
        records.push(record);
    }
    sort_records(&mut records, params.sort_key);

    let exporter = BatchExporter::new(config);
    let mut package = exporter.load_template(params.template_path.as_deref())?;

    let opts = RenderOptions {
        target_year: resolve_target_year(params.year_only, params.base_date),
        fill_machine_no: params.fill_machine_no,
        preferred_title: None,
    };
    let reports = exporter.render_into(
        &mut package,
        &records,
        &opts,
        params.sheet_title_format.as_deref(),
    )?;

    let output_path = params
        .output_path
        .clone()
        .unwrap_or_else(|| {
            config
                .export_dir
                .join(format!("history_cards_{}.ods", records.len()))
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
