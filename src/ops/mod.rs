use crate::render::renderer::RenderReport;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;

mod export_batch;
mod export_card;

pub use export_batch::{export_batch, ExportBatchParams};
pub use export_card::{export_card, ExportCardParams};

/// Result of an export call: where the document landed and what happened on
/// each sheet.
#[derive(Debug, Serialize)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub sheets: Vec<SheetOutcome>,
}

#[derive(Debug, Serialize)]
pub struct SheetOutcome {
    pub code: String,
    #[serde(flatten)]
    pub report: RenderReport,
}

pub(crate) fn resolve_target_year(year_only: bool, base_date: Option<NaiveDate>) -> Option<i32> {
    year_only.then(|| {
        base_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
            .year()
    })
}
