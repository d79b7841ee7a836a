use crate::ods::content_dom::{attr_by_local, attr_repeat, local_name};
use xmltree::{Element, XMLNode};

/// Rectangular merged span, 1-based inclusive. Regions never overlap within a
/// sheet; any write whose target falls inside one lands on the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRegion {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl MergedRegion {
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    pub fn anchor(&self) -> (u32, u32) {
        (self.min_row, self.min_col)
    }
}

/// Read-only snapshot of one sheet: cell texts for label scanning and merged
/// regions for write-anchor resolution. Scanned once per sheet before any
/// edit.
#[derive(Debug, Default)]
pub struct SheetGrid {
    texts: Vec<Vec<String>>,
    pub merges: Vec<MergedRegion>,
}

impl SheetGrid {
    /// Walks a `table:table` element, expanding repeat runs up to `max_rows` x
    /// `max_cols`. The caps keep trailer rows repeated a million times from
    /// blowing up the snapshot.
    pub fn scan(table: &Element, max_rows: usize, max_cols: usize) -> Self {
        let mut grid = SheetGrid::default();
        let mut row0 = 0usize;

        for node in &table.children {
            let row = match node {
                XMLNode::Element(e) if local_name(&e.name) == "table-row" => e,
                _ => continue,
            };
            if row0 >= max_rows {
                break;
            }
            let row_repeat = attr_repeat(row, "number-rows-repeated");
            let (texts, spans) = Self::scan_row(row, max_cols);

            let copies = row_repeat.min(max_rows - row0);
            for rep in 0..copies {
                let r = (row0 + rep) as u32 + 1;
                grid.texts.push(texts.clone());
                for &(col0, col_span, row_span) in &spans {
                    grid.merges.push(MergedRegion {
                        min_row: r,
                        min_col: col0 as u32 + 1,
                        max_row: r + row_span as u32 - 1,
                        max_col: (col0 + col_span) as u32,
                    });
                }
            }
            row0 += row_repeat;
        }
        grid
    }

    /// Per-row pass: text per column plus merged spans as (col0, col_span,
    /// row_span). Covered cells advance the column cursor; spans do not (their
    /// footprint is the covered cells that follow).
    fn scan_row(row: &Element, max_cols: usize) -> (Vec<String>, Vec<(usize, usize, usize)>) {
        let mut texts = Vec::new();
        let mut spans = Vec::new();
        let mut col0 = 0usize;

        for node in &row.children {
            if col0 >= max_cols {
                break;
            }
            let cell = match node {
                XMLNode::Element(e) if local_name(&e.name) == "table-cell" => e,
                XMLNode::Element(e) if local_name(&e.name) == "covered-table-cell" => {
                    let repeat = attr_repeat(e, "number-columns-repeated");
                    for _ in 0..repeat.min(max_cols - col0) {
                        texts.push(String::new());
                    }
                    col0 += repeat;
                    continue;
                }
                _ => continue,
            };

            let repeat = attr_repeat(cell, "number-columns-repeated");
            let row_span = attr_repeat(cell, "number-rows-spanned");
            let col_span = attr_repeat(cell, "number-columns-spanned");
            let text = Self::cell_text(cell);

            // A spanned cell advances only by its own repeat; the covered
            // cells that follow it account for the rest of the span footprint.
            for rep in 0..repeat {
                let at = col0 + rep;
                if at >= max_cols {
                    break;
                }
                if row_span > 1 || col_span > 1 {
                    spans.push((at, col_span, row_span));
                }
                texts.push(text.clone());
            }
            col0 += repeat;
        }
        (texts, spans)
    }

    fn cell_text(cell: &Element) -> String {
        let mut parts = Vec::new();
        for node in &cell.children {
            if let XMLNode::Element(p) = node {
                if local_name(&p.name) == "p" {
                    parts.push(Self::text_content(p));
                }
            }
        }
        if parts.is_empty() {
            if let Some(v) = attr_by_local(cell, "value") {
                return v.to_string();
            }
        }
        parts.join("\n")
    }

    fn text_content(element: &Element) -> String {
        let mut out = String::new();
        for node in &element.children {
            match node {
                XMLNode::Text(t) => out.push_str(t),
                XMLNode::Element(e) => out.push_str(&Self::text_content(e)),
                _ => {}
            }
        }
        out
    }

    /// 1-based cell text lookup.
    pub fn text(&self, row: u32, col: u32) -> Option<&str> {
        self.texts
            .get((row - 1) as usize)
            .and_then(|r| r.get((col - 1) as usize))
            .map(|s| s.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.texts.len()
    }

    pub fn row_texts(&self, row: u32) -> Option<&[String]> {
        self.texts.get((row - 1) as usize).map(|r| r.as_slice())
    }

    /// Merged-region-safe write target: the containing region's top-left when
    /// the position is covered, otherwise the position itself.
    pub fn resolve_write_anchor(&self, row: u32, col: u32) -> (u32, u32) {
        for region in &self.merges {
            if region.contains(row, col) {
                return region.anchor();
            }
        }
        (row, col)
    }
}
