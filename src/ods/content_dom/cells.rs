use super::*;

/// Resolved slot for a write. Covered cells belong to a merged region whose
/// anchor holds the content; writes there are dropped by the caller.
pub enum CellSlot<'a> {
    Cell(&'a mut Element),
    Covered,
}

impl TableEdit {
    /// Returns a dedicated cell element for the zero-based `col0` inside `row`,
    /// splitting repeated cell runs and padding short rows.
    pub fn cell_mut(row: &mut Element, col0: usize) -> Result<CellSlot<'_>, ExportError> {
        enum Found {
            At(usize),
            CoveredAt,
            Missing { cursor: usize },
        }

        let found = {
            let mut cursor = 0usize;
            let mut result = None;
            let mut i = 0usize;
            while i < row.children.len() {
                let (repeat, covered) = match &row.children[i] {
                    XMLNode::Element(e) if local_name(&e.name) == "table-cell" => {
                        (attr_repeat(e, "number-columns-repeated"), false)
                    }
                    XMLNode::Element(e) if local_name(&e.name) == "covered-table-cell" => {
                        (attr_repeat(e, "number-columns-repeated"), true)
                    }
                    _ => {
                        i += 1;
                        continue;
                    }
                };
                if col0 < cursor + repeat {
                    if covered {
                        result = Some(Found::CoveredAt);
                    } else if repeat == 1 {
                        result = Some(Found::At(i));
                    } else {
                        let idx = Self::split_run(
                            &mut row.children,
                            i,
                            col0 - cursor,
                            repeat,
                            "table:number-columns-repeated",
                        );
                        result = Some(Found::At(idx));
                    }
                    break;
                }
                cursor += repeat;
                i += 1;
            }
            result.unwrap_or(Found::Missing { cursor })
        };

        match found {
            Found::CoveredAt => Ok(CellSlot::Covered),
            Found::At(idx) => match &mut row.children[idx] {
                XMLNode::Element(e) => Ok(CellSlot::Cell(e)),
                _ => Err(ExportError::InvalidPackage(
                    "cell slot is not an element".to_string(),
                )),
            },
            Found::Missing { cursor } => {
                let gap = col0 - cursor;
                if gap > 0 {
                    let mut filler = Element::new("table:table-cell");
                    if gap > 1 {
                        filler.attributes.insert(
                            "table:number-columns-repeated".to_string(),
                            gap.to_string(),
                        );
                    }
                    row.children.push(XMLNode::Element(filler));
                }
                row.children
                    .push(XMLNode::Element(Element::new("table:table-cell")));
                match row.children.last_mut() {
                    Some(XMLNode::Element(e)) => Ok(CellSlot::Cell(e)),
                    _ => Err(ExportError::InvalidPackage(
                        "cell slot is not an element".to_string(),
                    )),
                }
            }
        }
    }

    /// Replaces a cell's value while keeping its style attributes, merge spans
    /// and any embedded frames.
    pub fn set_value(cell: &mut Element, value: &CellValue) {
        for name in [
            "value-type",
            "value",
            "boolean-value",
            "currency",
            "date-value",
            "time-value",
            "string-value",
        ] {
            remove_attr(cell, name);
        }
        cell.children.retain(|n| !is_element(n, "p"));

        let text = match value {
            CellValue::String(v) => {
                set_attr(cell, "office:value-type", "string");
                Some(v.clone())
            }
            CellValue::Number(v) => {
                set_attr(cell, "office:value-type", "float");
                set_attr(cell, "office:value", &v.to_string());
                Some(v.to_string())
            }
            CellValue::Currency { value, display } => {
                set_attr(cell, "office:value-type", "currency");
                set_attr(cell, "office:value", &value.to_string());
                Some(display.clone())
            }
            CellValue::Boolean(v) => {
                let b = if *v { "true" } else { "false" };
                set_attr(cell, "office:value-type", "boolean");
                set_attr(cell, "office:boolean-value", b);
                Some(b.to_string())
            }
            CellValue::Empty => None,
        };

        if let Some(text) = text {
            let mut p = Element::new("text:p");
            p.children.push(XMLNode::Text(text));
            cell.children.push(XMLNode::Element(p));
        }
    }
}
