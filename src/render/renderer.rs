use crate::common::errors::ExportError;
use crate::config::ExportConfig;
use crate::ods::cell_address::CellAddress;
use crate::ods::content_dom::{CellSlot, CellValue, ContentDom, FrameSpec, TableEdit};
use crate::ods::ods_file::OdsPackage;
use crate::ods::sheet_grid::SheetGrid;
use crate::ods::writer::write_cell;
use crate::record::{filter_by_year, RecordAggregate};
use crate::render::batch::TitleRegistry;
use crate::render::history::HistoryWriter;
use crate::render::photo::{safe_code, PhotoCompositor};
use crate::render::scanner::{find_accessory_header, find_label_cell};
use crate::template::FieldKind;
use serde::Serialize;
use tracing::warn;
use xmltree::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ManagementCode,
    MachineNumber,
    FixedFields,
    Photo,
    Accessories,
    History,
    SheetTitle,
}

/// Outcome of one best-effort section. Nothing here ever aborts the export;
/// the report is how suppressed failures stay observable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SectionStatus {
    Filled,
    Skipped(String),
    Degraded(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub sheet_title: String,
    pub sections: Vec<(Section, SectionStatus)>,
}

impl RenderReport {
    fn new() -> Self {
        Self {
            sheet_title: String::new(),
            sections: Vec::new(),
        }
    }

    fn push(&mut self, section: Section, status: SectionStatus) {
        match &status {
            SectionStatus::Filled => {}
            SectionStatus::Skipped(reason) => {
                warn!(?section, %reason, "section skipped");
            }
            SectionStatus::Degraded(reason) => {
                warn!(?section, %reason, "section degraded");
            }
        }
        self.sections.push((section, status));
    }

    pub fn status_of(&self, section: Section) -> Option<&SectionStatus> {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, status)| status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Restrict the history table to this year.
    pub target_year: Option<i32>,
    pub fill_machine_no: bool,
    /// Title the caller wants for the sheet, before sanitizing and
    /// deduplication. Falls back to record name, then code.
    pub preferred_title: Option<String>,
}

/// Fills one sheet from one record. Steps run in fixed order; every step after
/// template load degrades only its own section on failure.
pub struct CardRenderer<'a> {
    config: &'a ExportConfig,
}

impl<'a> CardRenderer<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    pub fn render(
        &self,
        dom: &mut ContentDom,
        sheet_index: usize,
        package: &mut OdsPackage,
        record: &RecordAggregate,
        opts: &RenderOptions,
        titles: &mut TitleRegistry,
    ) -> Result<RenderReport, ExportError> {
        let layout = &self.config.layout;
        let mut report = RenderReport::new();

        {
            let table = dom.table_mut(sheet_index)?;
            let scan_rows = (layout.history.start_row as usize + layout.history.clear_capacity)
                .max(layout.photo.logo_keep_row as usize + 8)
                .max(64);
            let grid = SheetGrid::scan(table, scan_rows, 64);

            let status = self.fill_management_code(table, &grid, record);
            report.push(Section::ManagementCode, status);

            if opts.fill_machine_no {
                let status = self.fill_machine_number(table, &grid, record);
                report.push(Section::MachineNumber, status);
            }

            let status = self
                .fill_fixed_fields(table, &grid, record)
                .unwrap_or_else(|e| SectionStatus::Degraded(e.to_string()));
            report.push(Section::FixedFields, status);

            let status = self
                .fill_photo(table, &grid, package, record, sheet_index)
                .unwrap_or_else(|e| SectionStatus::Degraded(e.to_string()));
            report.push(Section::Photo, status);

            let status = self
                .fill_accessories(table, &grid, record)
                .unwrap_or_else(|e| SectionStatus::Degraded(e.to_string()));
            report.push(Section::Accessories, status);

            let status = self
                .fill_history(table, &grid, record, opts)
                .unwrap_or_else(|e| SectionStatus::Degraded(e.to_string()));
            report.push(Section::History, status);
        }

        let base = opts
            .preferred_title
            .clone()
            .or_else(|| record.name.clone().filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| record.code.clone());
        let title = titles.claim(&base);
        dom.set_table_name(sheet_index, &title)?;
        report.sheet_title = title;
        report.push(Section::SheetTitle, SectionStatus::Filled);

        Ok(report)
    }

    /// Writes the code one row below its label cell. Silent skip when the
    /// template carries no label.
    fn fill_management_code(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        record: &RecordAggregate,
    ) -> SectionStatus {
        let layout = &self.config.layout;
        match find_label_cell(grid, &layout.management_label, layout.label_scan_rows) {
            Some((row, col)) => {
                let value = CellValue::String(record.code.clone());
                match write_cell(table, grid, row + 1, col, &value) {
                    Ok(_) => SectionStatus::Filled,
                    Err(e) => SectionStatus::Degraded(e.to_string()),
                }
            }
            None => SectionStatus::Skipped("management label not found".to_string()),
        }
    }

    /// Writes the code one column right of the machine label.
    fn fill_machine_number(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        record: &RecordAggregate,
    ) -> SectionStatus {
        let layout = &self.config.layout;
        match find_label_cell(grid, &layout.machine_label, layout.label_scan_rows) {
            Some((row, col)) => {
                let value = CellValue::String(record.code.clone());
                match write_cell(table, grid, row, col + 1, &value) {
                    Ok(_) => SectionStatus::Filled,
                    Err(e) => SectionStatus::Degraded(e.to_string()),
                }
            }
            None => SectionStatus::Skipped("machine label not found".to_string()),
        }
    }

    fn fill_fixed_fields(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        record: &RecordAggregate,
    ) -> Result<SectionStatus, ExportError> {
        let layout = &self.config.layout;
        let mut issues = Vec::new();

        for field in &layout.fields {
            let address = match CellAddress::parse(&field.cell) {
                Ok(a) => a,
                Err(e) => {
                    issues.push(e.to_string());
                    continue;
                }
            };
            let value = match self.field_value(field.field, record) {
                Some(v) => v,
                None => {
                    // Unparsable price: the cell keeps whatever the template
                    // had; only the report shows the miss.
                    issues.push(format!("unparsable value for {:?}", field.field));
                    continue;
                }
            };
            write_cell(table, grid, address.row, address.col, &value)?;
        }

        Ok(if issues.is_empty() {
            SectionStatus::Filled
        } else {
            SectionStatus::Degraded(issues.join("; "))
        })
    }

    fn field_value(&self, kind: FieldKind, record: &RecordAggregate) -> Option<CellValue> {
        let text = |v: &Option<String>| CellValue::String(v.clone().unwrap_or_default());
        Some(match kind {
            FieldKind::Name => text(&record.name),
            FieldKind::Model => text(&record.model),
            FieldKind::Size => text(&record.size),
            FieldKind::Maker => text(&record.maker),
            FieldKind::Location => text(&record.location),
            FieldKind::Purpose => text(&record.purpose),
            FieldKind::Note => text(&record.note),
            FieldKind::Power => CellValue::String(power_display(record)),
            FieldKind::IntakeDate => CellValue::String(
                record
                    .intake
                    .and_then(|d| d.to_date())
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            FieldKind::MakerPhone => CellValue::String(format!(
                "Tel : {}",
                record.maker_phone.clone().unwrap_or_default()
            )),
            FieldKind::PurchasePrice => match &record.purchase_price {
                None => CellValue::String(String::new()),
                Some(raw) => {
                    let cleaned: String =
                        raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
                    let value: f64 = cleaned.parse().ok()?;
                    CellValue::Currency {
                        value,
                        display: format!(
                            "{}{}",
                            self.config.layout.currency_symbol,
                            group_thousands(value)
                        ),
                    }
                }
            },
        })
    }

    /// Old photos go first, the logo below the keep threshold stays, then the
    /// resized photo is embedded at the anchor.
    fn fill_photo(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        package: &mut OdsPackage,
        record: &RecordAggregate,
        sheet_index: usize,
    ) -> Result<SectionStatus, ExportError> {
        let photo = &self.config.layout.photo;
        TableEdit::wipe_frames_above(table, (photo.logo_keep_row - 1) as usize);

        let Some(path) = &record.photo_path else {
            return Ok(SectionStatus::Skipped("no photo resolved".to_string()));
        };

        let compositor = PhotoCompositor::new(self.config);
        let bytes = match compositor.prepare_exact_size(path, photo.width_cm, photo.height_cm) {
            Ok(bytes) => bytes,
            Err(e) => return Ok(SectionStatus::Degraded(format!("photo skipped: {e}"))),
        };

        let anchor = CellAddress::parse(&photo.anchor)?;
        let (row, col) = grid.resolve_write_anchor(anchor.row, anchor.col);

        let stem = {
            let s = safe_code(&record.code);
            if s.is_empty() {
                format!("sheet{}", sheet_index + 1)
            } else {
                s
            }
        };
        let href = package.add_picture(&format!("card_photo_{stem}.png"), bytes, "image/png")?;

        let row_el = TableEdit::row_mut(table, (row - 1) as usize)?;
        match TableEdit::cell_mut(row_el, (col - 1) as usize)? {
            CellSlot::Cell(cell) => {
                TableEdit::insert_frame(
                    cell,
                    &FrameSpec {
                        name: format!("CardPhoto{}", sheet_index + 1),
                        href,
                        width_cm: photo.width_cm,
                        height_cm: photo.height_cm,
                    },
                );
                Ok(SectionStatus::Filled)
            }
            CellSlot::Covered => Ok(SectionStatus::Degraded(
                "photo anchor is a covered cell".to_string(),
            )),
        }
    }

    /// Sequence numbers 1..capacity always land; the three text columns are
    /// blanked first so leftovers from the template never bleed through.
    fn fill_accessories(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        record: &RecordAggregate,
    ) -> Result<SectionStatus, ExportError> {
        let layout = &self.config.layout.accessories;
        let Some(header) = find_accessory_header(grid, layout) else {
            return Ok(SectionStatus::Skipped(
                "accessory header not found".to_string(),
            ));
        };

        let columns = header.columns;
        let index_col = columns
            .index
            .or_else(|| columns.name.map(|c| c.saturating_sub(1).max(1)))
            .unwrap_or(1);
        let text_cols = [columns.name, columns.spec, columns.note];

        for i in 1..=layout.capacity as u32 {
            let row = header.header_row + i;
            write_cell(table, grid, row, index_col, &CellValue::Number(i as f64))?;
            for col in text_cols.into_iter().flatten() {
                write_cell(table, grid, row, col, &CellValue::String(String::new()))?;
            }
        }

        for (i, accessory) in record.accessories.iter().take(layout.capacity).enumerate() {
            let row = header.header_row + i as u32 + 1;
            let entries = [
                (columns.name, &accessory.name),
                (columns.spec, &accessory.spec),
                (columns.note, &accessory.note),
            ];
            for (col, value) in entries {
                if let Some(col) = col {
                    let text = CellValue::String(value.clone().unwrap_or_default());
                    write_cell(table, grid, row, col, &text)?;
                }
            }
        }
        Ok(SectionStatus::Filled)
    }

    fn fill_history(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        record: &RecordAggregate,
        opts: &RenderOptions,
    ) -> Result<SectionStatus, ExportError> {
        let writer = HistoryWriter::from_layout(&self.config.layout.history)?;
        writer.clear(table, grid)?;

        let entries = match opts.target_year {
            Some(year) => filter_by_year(&record.history, year),
            None => record.history.clone(),
        };
        writer.write_rows(table, grid, &entries)?;
        Ok(SectionStatus::Filled)
    }
}

fn power_display(record: &RecordAggregate) -> String {
    match (&record.voltage, record.power_kw) {
        (Some(v), Some(kw)) => format!("{v}  {kw}kW"),
        (Some(v), None) => v.clone(),
        (None, Some(kw)) => format!("{kw}kW"),
        (None, None) => String::new(),
    }
}

/// Groups the integer part with commas; fractional prices keep two decimals.
fn group_thousands(value: f64) -> String {
    let negative = value < 0.0;
    let abs = value.abs();
    let int_part = abs.trunc() as u64;
    let frac = abs.fract();

    let digits = int_part.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if frac > 1e-9 {
        out.push_str(&format!("{frac:.2}")[1..]);
    }
    out
}
