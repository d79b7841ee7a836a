use super::*;

/// Placement request for an embedded picture. Width and height are physical
/// centimeters, written verbatim as `svg:width`/`svg:height`.
#[derive(Debug, Clone)]
pub struct FrameSpec {
    pub name: String,
    pub href: String,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl TableEdit {
    /// Removes every `draw:frame` anchored in a row strictly above the
    /// zero-based `keep_row0`. Frames at or below the threshold stay, which is
    /// how a fixed footer logo survives photo replacement.
    pub fn wipe_frames_above(table: &mut Element, keep_row0: usize) -> usize {
        let mut removed = 0usize;
        let mut cursor = 0usize;
        for node in &mut table.children {
            let row = match node {
                XMLNode::Element(e) if local_name(&e.name) == "table-row" => e,
                _ => continue,
            };
            let repeat = attr_repeat(row, "number-rows-repeated");
            if cursor < keep_row0 {
                for cell_node in &mut row.children {
                    let cell = match cell_node {
                        XMLNode::Element(e)
                            if matches!(
                                local_name(&e.name),
                                "table-cell" | "covered-table-cell"
                            ) =>
                        {
                            e
                        }
                        _ => continue,
                    };
                    let before = cell.children.len();
                    cell.children.retain(|n| !is_element(n, "frame"));
                    removed += before - cell.children.len();
                }
            }
            cursor += repeat;
        }
        removed
    }

    /// Embeds a picture frame at the start of `cell`'s children.
    pub fn insert_frame(cell: &mut Element, spec: &FrameSpec) {
        let mut frame = Element::new("draw:frame");
        frame
            .attributes
            .insert("draw:name".to_string(), spec.name.clone());
        frame
            .attributes
            .insert("draw:z-index".to_string(), "0".to_string());
        frame
            .attributes
            .insert("svg:width".to_string(), format!("{}cm", spec.width_cm));
        frame
            .attributes
            .insert("svg:height".to_string(), format!("{}cm", spec.height_cm));
        frame
            .attributes
            .insert("svg:x".to_string(), "0cm".to_string());
        frame
            .attributes
            .insert("svg:y".to_string(), "0cm".to_string());

        let mut image = Element::new("draw:image");
        image
            .attributes
            .insert("xlink:href".to_string(), spec.href.clone());
        image
            .attributes
            .insert("xlink:type".to_string(), "simple".to_string());
        image
            .attributes
            .insert("xlink:show".to_string(), "embed".to_string());
        image
            .attributes
            .insert("xlink:actuate".to_string(), "onLoad".to_string());
        frame.children.push(XMLNode::Element(image));

        cell.children.insert(0, XMLNode::Element(frame));
    }
}
