use crate::common::errors::ExportError;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Fully-materialized data bundle for one equipment record. Built by the
/// repository inside a short read-only transaction, then rendered without
/// touching storage again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordAggregate {
    pub code: String,
    pub name: Option<String>,
    pub model: Option<String>,
    pub size: Option<String>,
    pub voltage: Option<String>,
    pub power_kw: Option<f64>,
    pub maker: Option<String>,
    pub maker_phone: Option<String>,
    pub intake: Option<IntakeDate>,
    /// Raw price text as stored, possibly with thousands separators.
    pub purchase_price: Option<String>,
    pub location: Option<String>,
    pub purpose: Option<String>,
    pub note: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub accessories: Vec<Accessory>,
    /// Resolved on-disk photo, if any. Absence is not an error.
    pub photo_path: Option<PathBuf>,
}

/// Intake date recorded as loose parts; month and day may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl IntakeDate {
    /// Missing month/day default to 1. Out-of-range parts yield no date.
    pub fn to_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Deterministic tiebreaker for same-date entries.
    pub id: i64,
    pub date: NaiveDate,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub vendor: Option<String>,
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accessory {
    pub name: Option<String>,
    pub spec: Option<String>,
    pub note: Option<String>,
}

/// Ascending (date, id). Applied defensively before writing so rendering
/// order never depends on repository ordering.
pub fn sort_chronologically(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| (a.date, a.id).cmp(&(b.date, b.id)));
}

/// Keeps entries dated inside `year`. Pure and idempotent.
pub fn filter_by_year(entries: &[HistoryEntry], year: i32) -> Vec<HistoryEntry> {
    use chrono::Datelike;
    entries
        .iter()
        .filter(|e| e.date.year() == year)
        .cloned()
        .collect()
}

pub trait EquipmentRepository {
    fn get(&self, code: &str) -> Result<Option<RecordAggregate>, ExportError>;
}

pub trait PhotoRepository {
    /// Registered photo path for a record, relative to the photo root or
    /// absolute. The compositor turns this into an on-disk file.
    fn resolve(&self, code: &str) -> Option<String>;
}
