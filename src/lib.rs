//! Template-driven history-card exporter for equipment records.
//!
//! Fills a fixed-layout ODS template with one equipment record (identity
//! fields, maintenance history, accessories, a photo) or with a batch of
//! records, one sheet each. The template file is plain spreadsheet content:
//! fixed addresses and label text document the layout, and the engine scans
//! for what it needs. Missing optional pieces — no photo, no accessory table,
//! a label that moved — degrade only their own section; the export still
//! produces a document.

pub mod common;
pub mod config;
pub mod ods;
pub mod ops;
pub mod record;
pub mod render;
pub mod template;

pub use common::errors::ExportError;
pub use config::ExportConfig;
pub use ops::{export_batch, export_card, ExportBatchParams, ExportCardParams, ExportOutcome};
pub use record::{
    Accessory, EquipmentRepository, HistoryEntry, IntakeDate, PhotoRepository, RecordAggregate,
};
pub use template::TemplateLayout;
