use crate::ods::sheet_grid::SheetGrid;
use crate::template::AccessoryLayout;

/// Folds a label or cell text for fuzzy matching: every alphanumeric
/// character of any script survives, lowercased; punctuation, spacing and
/// line breaks drop out.
pub fn normalize_label(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Column positions discovered for the accessory table, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessoryColumns {
    pub index: Option<u32>,
    pub name: Option<u32>,
    pub spec: Option<u32>,
    pub note: Option<u32>,
}

impl AccessoryColumns {
    pub fn matched(&self) -> usize {
        [self.index, self.name, self.spec, self.note]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AccessoryHeader {
    pub header_row: u32,
    pub columns: AccessoryColumns,
}

/// Locates the accessory table wherever the template author put it. A row
/// qualifies when enough of the expected labels appear among its folded cell
/// texts; the first qualifying row wins, and within it the first occurrence of
/// each label wins. `None` is a normal outcome — the caller skips the section.
pub fn find_accessory_header(grid: &SheetGrid, layout: &AccessoryLayout) -> Option<AccessoryHeader> {
    let index_label = normalize_label(&layout.index_label);
    let name_label = normalize_label(&layout.name_label);
    let spec_label = normalize_label(&layout.spec_label);
    let note_label = normalize_label(&layout.note_label);

    for row in 1..=grid.row_count() as u32 {
        let texts = grid.row_texts(row)?;
        let folded: Vec<String> = texts.iter().map(|t| normalize_label(t)).collect();

        let mut columns = AccessoryColumns {
            index: None,
            name: None,
            spec: None,
            note: None,
        };
        for (i, cell) in folded.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col = i as u32 + 1;
            // The index header must match exactly ("No" would otherwise hit
            // inside "Note"); the text columns match by containment so
            // decorated headers like "Name / type" still qualify.
            if columns.index.is_none() && *cell == index_label {
                columns.index = Some(col);
            }
            if columns.name.is_none() && cell.contains(&name_label) {
                columns.name = Some(col);
            }
            if columns.spec.is_none() && cell.contains(&spec_label) {
                columns.spec = Some(col);
            }
            if columns.note.is_none() && cell.contains(&note_label) {
                columns.note = Some(col);
            }
        }

        if columns.matched() >= layout.min_label_matches {
            return Some(AccessoryHeader {
                header_row: row,
                columns,
            });
        }
    }
    None
}

/// Finds the first cell in the top `scan_rows` rows whose folded text equals
/// the folded label. Returns the 1-based position.
pub fn find_label_cell(grid: &SheetGrid, label: &str, scan_rows: u32) -> Option<(u32, u32)> {
    let wanted = normalize_label(label);
    if wanted.is_empty() {
        return None;
    }
    let limit = scan_rows.min(grid.row_count() as u32);
    for row in 1..=limit {
        if let Some(texts) = grid.row_texts(row) {
            for (i, text) in texts.iter().enumerate() {
                if normalize_label(text) == wanted {
                    return Some((row, i as u32 + 1));
                }
            }
        }
    }
    None
}
