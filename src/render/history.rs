use crate::common::errors::ExportError;
use crate::ods::cell_address::CellAddress;
use crate::ods::content_dom::CellValue;
use crate::ods::sheet_grid::SheetGrid;
use crate::ods::writer::write_cell;
use crate::record::{sort_chronologically, HistoryEntry};
use crate::template::HistoryLayout;
use std::collections::HashSet;
use xmltree::Element;

/// Fixed-region chronological table: clear what the template (or a previous
/// fill) left behind, then write one row per entry from the start row down.
pub struct HistoryWriter {
    start_row: u32,
    columns: [u32; 6],
    clear_capacity: usize,
}

impl HistoryWriter {
    pub fn from_layout(layout: &HistoryLayout) -> Result<Self, ExportError> {
        let columns = [
            CellAddress::parse_column(&layout.date_col)?,
            CellAddress::parse_column(&layout.kind_col)?,
            CellAddress::parse_column(&layout.title_col)?,
            CellAddress::parse_column(&layout.detail_col)?,
            CellAddress::parse_column(&layout.vendor_col)?,
            CellAddress::parse_column(&layout.hours_col)?,
        ];
        Ok(Self {
            start_row: layout.start_row,
            columns,
            clear_capacity: layout.clear_capacity,
        })
    }

    /// Blanks the table region: every mapped column, `clear_capacity` rows down
    /// from the start, plus the anchors of merged regions that overlap it.
    /// The header row and anything above the start row are never touched.
    /// Cells the snapshot already shows as empty are left alone.
    pub fn clear(&self, table: &mut Element, grid: &SheetGrid) -> Result<usize, ExportError> {
        let min_col = *self.columns.iter().min().unwrap_or(&1);
        let max_col = *self.columns.iter().max().unwrap_or(&1);
        let end_row = self.start_row + self.clear_capacity as u32 - 1;

        let mut blanked = HashSet::new();
        let mut cleared = 0usize;

        for region in &grid.merges {
            let (anchor_row, anchor_col) = region.anchor();
            if anchor_row < self.start_row || anchor_row > end_row {
                continue;
            }
            if region.min_col > max_col || region.max_col < min_col {
                continue;
            }
            if self.blank(table, grid, anchor_row, anchor_col, &mut blanked)? {
                cleared += 1;
            }
        }

        for row in self.start_row..=end_row {
            for col in self.columns {
                if self.blank(table, grid, row, col, &mut blanked)? {
                    cleared += 1;
                }
            }
        }
        Ok(cleared)
    }

    fn blank(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        row: u32,
        col: u32,
        blanked: &mut HashSet<(u32, u32)>,
    ) -> Result<bool, ExportError> {
        let anchor = grid.resolve_write_anchor(row, col);
        if !blanked.insert(anchor) {
            return Ok(false);
        }
        match grid.text(anchor.0, anchor.1) {
            Some(text) if !text.is_empty() => {
                write_cell(table, grid, anchor.0, anchor.1, &CellValue::Empty)
            }
            _ => Ok(false),
        }
    }

    /// Writes entries in (date, id) order, one row each, starting at the fixed
    /// start row. Missing fields render as empty strings. The writing pass is
    /// not bounded by the clear capacity.
    pub fn write_rows(
        &self,
        table: &mut Element,
        grid: &SheetGrid,
        entries: &[HistoryEntry],
    ) -> Result<usize, ExportError> {
        let mut ordered: Vec<HistoryEntry> = entries.to_vec();
        sort_chronologically(&mut ordered);

        let [date_col, kind_col, title_col, detail_col, vendor_col, hours_col] = self.columns;
        for (i, entry) in ordered.iter().enumerate() {
            let row = self.start_row + i as u32;
            let text = |v: &Option<String>| CellValue::String(v.clone().unwrap_or_default());

            write_cell(
                table,
                grid,
                row,
                date_col,
                &CellValue::String(entry.date.format("%Y-%m-%d").to_string()),
            )?;
            write_cell(table, grid, row, kind_col, &text(&entry.kind))?;
            write_cell(table, grid, row, title_col, &text(&entry.title))?;
            write_cell(table, grid, row, detail_col, &text(&entry.detail))?;
            write_cell(table, grid, row, vendor_col, &text(&entry.vendor))?;
            let hours = match entry.hours {
                Some(h) => CellValue::Number(h),
                None => CellValue::String(String::new()),
            };
            write_cell(table, grid, row, hours_col, &hours)?;
        }
        Ok(ordered.len())
    }
}
