use crate::common::errors::ExportError;
use serde::{Deserialize, Serialize};
use xmltree::{Element, EmitterConfig, XMLNode};

mod cells;
mod frames;
mod rows;

pub use cells::CellSlot;
pub use frames::FrameSpec;

/// Value written into a cell. `Currency` carries the display text so the
/// rendered document shows a formatted amount next to the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CellValue {
    String(String),
    Number(f64),
    Currency { value: f64, display: String },
    Boolean(bool),
    Empty,
}

/// Parsed content.xml. All edits preserve attributes and children they do not
/// own, so template styling survives untouched.
pub struct ContentDom {
    root: Element,
}

/// Namespace-prefix-agnostic edit operations on a single `table:table` element.
pub struct TableEdit;

impl ContentDom {
    pub fn parse(xml: &str) -> Result<Self, ExportError> {
        let root = Element::parse(xml.as_bytes())?;
        Ok(Self { root })
    }

    pub fn to_xml(&self) -> Result<String, ExportError> {
        let mut out = Vec::new();
        self.root.write_with_config(
            &mut out,
            EmitterConfig::new()
                .perform_indent(true)
                .write_document_declaration(true),
        )?;
        String::from_utf8(out).map_err(|e| ExportError::XmlParseError(e.to_string()))
    }

    fn spreadsheet(&self) -> Result<&Element, ExportError> {
        let body = child_by_local(&self.root, "body")
            .ok_or_else(|| ExportError::InvalidPackage("missing office:body".to_string()))?;
        child_by_local(body, "spreadsheet")
            .ok_or_else(|| ExportError::InvalidPackage("missing office:spreadsheet".to_string()))
    }

    fn spreadsheet_mut(&mut self) -> Result<&mut Element, ExportError> {
        let body = child_mut_by_local(&mut self.root, "body")
            .ok_or_else(|| ExportError::InvalidPackage("missing office:body".to_string()))?;
        child_mut_by_local(body, "spreadsheet")
            .ok_or_else(|| ExportError::InvalidPackage("missing office:spreadsheet".to_string()))
    }

    pub fn table_count(&self) -> usize {
        self.spreadsheet()
            .map(|s| {
                s.children
                    .iter()
                    .filter(|n| is_element(n, "table"))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn table_names(&self) -> Result<Vec<String>, ExportError> {
        let spreadsheet = self.spreadsheet()?;
        let mut names = Vec::new();
        for child in &spreadsheet.children {
            if let XMLNode::Element(table) = child {
                if local_name(&table.name) == "table" {
                    names.push(attr_by_local(table, "name").unwrap_or("Sheet").to_string());
                }
            }
        }
        Ok(names)
    }

    pub fn table(&self, index: usize) -> Result<&Element, ExportError> {
        self.spreadsheet()?
            .children
            .iter()
            .filter_map(|n| match n {
                XMLNode::Element(e) if local_name(&e.name) == "table" => Some(e),
                _ => None,
            })
            .nth(index)
            .ok_or_else(|| ExportError::InvalidInput(format!("no sheet at index {index}")))
    }

    pub fn table_mut(&mut self, index: usize) -> Result<&mut Element, ExportError> {
        self.spreadsheet_mut()?
            .children
            .iter_mut()
            .filter_map(|n| match n {
                XMLNode::Element(e) if local_name(&e.name) == "table" => Some(e),
                _ => None,
            })
            .nth(index)
            .ok_or_else(|| ExportError::InvalidInput(format!("no sheet at index {index}")))
    }

    /// Deep copy of a table element, used to capture the unfilled template sheet
    /// before any rendering happens.
    pub fn clone_table(&self, index: usize) -> Result<Element, ExportError> {
        Ok(self.table(index)?.clone())
    }

    /// Inserts `table` after the last existing table element.
    pub fn append_table(&mut self, table: Element) -> Result<(), ExportError> {
        let spreadsheet = self.spreadsheet_mut()?;
        let insert_at = spreadsheet
            .children
            .iter()
            .rposition(|n| is_element(n, "table"))
            .map(|i| i + 1)
            .unwrap_or(spreadsheet.children.len());
        spreadsheet
            .children
            .insert(insert_at, XMLNode::Element(table));
        Ok(())
    }

    pub fn set_table_name(&mut self, index: usize, name: &str) -> Result<(), ExportError> {
        let table = self.table_mut(index)?;
        set_attr(table, "table:name", name);
        Ok(())
    }
}

pub(crate) fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

pub(crate) fn is_element(node: &XMLNode, local: &str) -> bool {
    matches!(node, XMLNode::Element(e) if local_name(&e.name) == local)
}

pub(crate) fn child_by_local<'a>(element: &'a Element, local: &str) -> Option<&'a Element> {
    element.children.iter().find_map(|n| match n {
        XMLNode::Element(e) if local_name(&e.name) == local => Some(e),
        _ => None,
    })
}

pub(crate) fn child_mut_by_local<'a>(
    element: &'a mut Element,
    local: &str,
) -> Option<&'a mut Element> {
    element.children.iter_mut().find_map(|n| match n {
        XMLNode::Element(e) if local_name(&e.name) == local => Some(e),
        _ => None,
    })
}

pub(crate) fn attr_by_local<'a>(element: &'a Element, local: &str) -> Option<&'a str> {
    element
        .attributes
        .iter()
        .find(|(k, _)| local_name(k) == local)
        .map(|(_, v)| v.as_str())
}

/// Overwrites an attribute matched by local name, inserting under the qualified
/// key when no variant of it exists yet.
pub(crate) fn set_attr(element: &mut Element, qualified: &str, value: &str) {
    let existing = element
        .attributes
        .keys()
        .find(|k| local_name(k) == local_name(qualified))
        .cloned();
    let key = existing.unwrap_or_else(|| qualified.to_string());
    element.attributes.insert(key, value.to_string());
}

pub(crate) fn remove_attr(element: &mut Element, local: &str) {
    element.attributes.retain(|k, _| local_name(k) != local);
}

/// ODS compresses runs of identical rows/cells with repeat attributes.
pub(crate) fn attr_repeat(element: &Element, local: &str) -> usize {
    attr_by_local(element, local)
        .and_then(|v| v.parse::<usize>().ok())
        .map(|n| n.max(1))
        .unwrap_or(1)
}
