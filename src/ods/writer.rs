use crate::common::errors::ExportError;
use crate::ods::content_dom::{CellSlot, CellValue, TableEdit};
use crate::ods::sheet_grid::SheetGrid;
use tracing::debug;
use xmltree::Element;

/// The one write path used by every renderer section: resolves the
/// merged-region anchor for a 1-based position, then sets the value. Returns
/// false when the slot turned out to be covered (malformed template), which is
/// skipped rather than raised.
pub fn write_cell(
    table: &mut Element,
    grid: &SheetGrid,
    row: u32,
    col: u32,
    value: &CellValue,
) -> Result<bool, ExportError> {
    let (row, col) = grid.resolve_write_anchor(row, col);
    let row_el = TableEdit::row_mut(table, (row - 1) as usize)?;
    match TableEdit::cell_mut(row_el, (col - 1) as usize)? {
        CellSlot::Cell(cell) => {
            TableEdit::set_value(cell, value);
            Ok(true)
        }
        CellSlot::Covered => {
            debug!(row, col, "write target is a covered cell, skipping");
            Ok(false)
        }
    }
}
