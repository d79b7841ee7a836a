use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Layout contract of the card template. The template file itself carries no
/// machine-readable markers; these addresses and labels document where the
/// shipped layout expects each piece of data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLayout {
    /// Fixed identity fields, written through merged-region resolution.
    pub fields: Vec<FieldCell>,
    /// Label whose cell marks the management-code slot; the value goes one row
    /// below the label.
    pub management_label: String,
    /// Optional second label; the value goes one column to the right.
    pub machine_label: String,
    /// Labels are only searched within this many top rows.
    pub label_scan_rows: u32,
    pub currency_symbol: String,
    pub accessories: AccessoryLayout,
    pub history: HistoryLayout,
    pub photo: PhotoLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCell {
    pub field: FieldKind,
    /// A1 notation; parsed at render time so one bad address only degrades its
    /// own field.
    pub cell: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Model,
    Size,
    Power,
    Maker,
    IntakeDate,
    PurchasePrice,
    Location,
    Purpose,
    MakerPhone,
    Note,
}

/// The accessory table is found by scanning for its header labels, not by a
/// fixed address; the template author may move it freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryLayout {
    pub index_label: String,
    pub name_label: String,
    pub spec_label: String,
    pub note_label: String,
    /// Rows reserved under the header; extra accessories are dropped.
    pub capacity: usize,
    /// A row qualifies as the header when at least this many labels match.
    pub min_label_matches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryLayout {
    /// First data row, 1-based. The header row sits directly above and is
    /// never touched.
    pub start_row: u32,
    pub date_col: String,
    pub kind_col: String,
    pub title_col: String,
    pub detail_col: String,
    pub vendor_col: String,
    pub hours_col: String,
    /// Bounds the clearing pass only; writing is unbounded downward.
    pub clear_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoLayout {
    pub anchor: String,
    pub width_cm: f64,
    pub height_cm: f64,
    /// Frames anchored at or below this row survive photo replacement (the
    /// footer logo lives there).
    pub logo_keep_row: u32,
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldCell::new(FieldKind::Name, "D5"),
                FieldCell::new(FieldKind::Model, "D6"),
                FieldCell::new(FieldKind::Size, "D7"),
                FieldCell::new(FieldKind::Power, "D8"),
                FieldCell::new(FieldKind::Maker, "D9"),
                FieldCell::new(FieldKind::IntakeDate, "D10"),
                FieldCell::new(FieldKind::PurchasePrice, "D11"),
                FieldCell::new(FieldKind::Location, "D12"),
                FieldCell::new(FieldKind::Purpose, "D13"),
                FieldCell::new(FieldKind::MakerPhone, "A15"),
                FieldCell::new(FieldKind::Note, "A16"),
            ],
            management_label: "Management No.".to_string(),
            machine_label: "Machine No.".to_string(),
            label_scan_rows: 25,
            currency_symbol: "₩".to_string(),
            accessories: AccessoryLayout::default(),
            history: HistoryLayout::default(),
            photo: PhotoLayout::default(),
        }
    }
}

impl FieldCell {
    pub fn new(field: FieldKind, cell: &str) -> Self {
        Self {
            field,
            cell: cell.to_string(),
        }
    }
}

impl Default for AccessoryLayout {
    fn default() -> Self {
        Self {
            index_label: "No".to_string(),
            name_label: "Name".to_string(),
            spec_label: "Spec".to_string(),
            note_label: "Note".to_string(),
            capacity: 7,
            min_label_matches: 3,
        }
    }
}

impl Default for HistoryLayout {
    fn default() -> Self {
        Self {
            start_row: 28,
            date_col: "A".to_string(),
            kind_col: "D".to_string(),
            title_col: "E".to_string(),
            detail_col: "H".to_string(),
            vendor_col: "J".to_string(),
            hours_col: "K".to_string(),
            clear_capacity: 400,
        }
    }
}

impl Default for PhotoLayout {
    fn default() -> Self {
        Self {
            anchor: "G6".to_string(),
            width_cm: 11.67,
            height_cm: 9.74,
            logo_keep_row: 32,
        }
    }
}

/// Probes candidate directories in order for the configured template file.
pub struct TemplateLocator<'a> {
    search_dirs: &'a [PathBuf],
    file_name: &'a str,
}

impl<'a> TemplateLocator<'a> {
    pub fn new(search_dirs: &'a [PathBuf], file_name: &'a str) -> Self {
        Self {
            search_dirs,
            file_name,
        }
    }

    /// An explicit path short-circuits the search but must itself exist.
    pub fn locate(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return path.is_file().then(|| path.to_path_buf());
        }
        self.search_dirs
            .iter()
            .map(|dir| dir.join(self.file_name))
            .find(|candidate| candidate.is_file())
    }

    pub fn describe_search(&self) -> String {
        let dirs: Vec<String> = self
            .search_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        format!("{} in [{}]", self.file_name, dirs.join(", "))
    }
}
