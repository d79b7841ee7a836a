use super::*;

impl TableEdit {
    /// Returns a dedicated element for the zero-based `row0`, splitting repeated
    /// row runs around the target and appending filler rows past the end of the
    /// sheet when needed.
    pub fn row_mut(table: &mut Element, row0: usize) -> Result<&mut Element, ExportError> {
        let idx = Self::ensure_row_index(table, row0)?;
        match &mut table.children[idx] {
            XMLNode::Element(e) => Ok(e),
            _ => Err(ExportError::InvalidPackage(
                "row slot is not an element".to_string(),
            )),
        }
    }

    fn ensure_row_index(table: &mut Element, target: usize) -> Result<usize, ExportError> {
        let mut cursor = 0usize;
        let mut after_last_row = None;
        let mut i = 0usize;
        while i < table.children.len() {
            let repeat = match &table.children[i] {
                XMLNode::Element(e) if local_name(&e.name) == "table-row" => {
                    attr_repeat(e, "number-rows-repeated")
                }
                _ => {
                    i += 1;
                    continue;
                }
            };

            if target < cursor + repeat {
                if repeat == 1 {
                    return Ok(i);
                }
                return Ok(Self::split_run(
                    &mut table.children,
                    i,
                    target - cursor,
                    repeat,
                    "table:number-rows-repeated",
                ));
            }
            cursor += repeat;
            after_last_row = Some(i + 1);
            i += 1;
        }

        // Past the end of the recorded rows: pad with one repeated empty row,
        // then a fresh element the caller can edit.
        let mut at = after_last_row.unwrap_or(table.children.len());
        let gap = target - cursor;
        if gap > 0 {
            let mut filler = Element::new("table:table-row");
            if gap > 1 {
                filler
                    .attributes
                    .insert("table:number-rows-repeated".to_string(), gap.to_string());
            }
            table.children.insert(at, XMLNode::Element(filler));
            at += 1;
        }
        table
            .children
            .insert(at, XMLNode::Element(Element::new("table:table-row")));
        Ok(at)
    }

    /// Splits a repeated element at `children[index]` into before / target /
    /// after parts. A repeat run means N identical siblings, so cloning the
    /// element (children included) into each part preserves document meaning.
    /// Returns the index of the dedicated target element.
    pub(super) fn split_run(
        children: &mut Vec<XMLNode>,
        index: usize,
        before: usize,
        repeat: usize,
        repeat_attr: &str,
    ) -> usize {
        let after = repeat - before - 1;
        let original = match children.remove(index) {
            XMLNode::Element(e) => e,
            other => {
                children.insert(index, other);
                return index;
            }
        };

        let mut insert_at = index;
        if before > 0 {
            let mut part = original.clone();
            Self::set_repeat(&mut part, repeat_attr, before);
            children.insert(insert_at, XMLNode::Element(part));
            insert_at += 1;
        }

        let mut target = original.clone();
        remove_attr(&mut target, local_name(repeat_attr));
        children.insert(insert_at, XMLNode::Element(target));
        let target_idx = insert_at;
        insert_at += 1;

        if after > 0 {
            let mut part = original;
            Self::set_repeat(&mut part, repeat_attr, after);
            children.insert(insert_at, XMLNode::Element(part));
        }
        target_idx
    }

    fn set_repeat(element: &mut Element, repeat_attr: &str, count: usize) {
        if count > 1 {
            set_attr(element, repeat_attr, &count.to_string());
        } else {
            remove_attr(element, local_name(repeat_attr));
        }
    }
}
