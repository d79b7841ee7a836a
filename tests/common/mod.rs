#![allow(dead_code)]

use equipcard::ods::ods_file::OdsPackage;
use equipcard::record::{
    Accessory, EquipmentRepository, HistoryEntry, PhotoRepository, RecordAggregate,
};
use equipcard::{ExportConfig, ExportError};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use xmltree::{Element, XMLNode};
use zip::ZipArchive;

static INIT_LOGS: Once = Once::new();

pub fn init_logs() {
    INIT_LOGS.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Card template fixture: labels in the top rows, a merged name slot, an old
/// photo frame at G6, an accessory header at row 18, a history header at row
/// 27 with stale entries below it, a footer logo at row 40 and a big repeated
/// trailer.
pub fn template_content_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" xmlns:xlink="http://www.w3.org/1999/xlink" office:version="1.2">
  <office:body>
    <office:spreadsheet>
      <table:table table:name="Card">
        <table:table-column table:number-columns-repeated="12"/>
        <table:table-row table:number-rows-repeated="2"><table:table-cell table:number-columns-repeated="12"/></table:table-row>
        <table:table-row>
          <table:table-cell office:value-type="string"><text:p>Management No.</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="2"/>
          <table:table-cell office:value-type="string"><text:p>Machine No.</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="8"/>
        </table:table-row>
        <table:table-row><table:table-cell table:number-columns-repeated="12"/></table:table-row>
        <table:table-row>
          <table:table-cell office:value-type="string"><text:p>Name</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="2"/>
          <table:table-cell table:style-name="ce1" table:number-columns-spanned="3" table:number-rows-spanned="1"/>
          <table:covered-table-cell table:number-columns-repeated="2"/>
          <table:table-cell table:number-columns-repeated="6"/>
        </table:table-row>
        <table:table-row>
          <table:table-cell table:number-columns-repeated="6"/>
          <table:table-cell><draw:frame draw:name="OldPhoto" svg:width="1cm" svg:height="1cm"><draw:image xlink:href="Pictures/old.png" xlink:type="simple" xlink:show="embed" xlink:actuate="onLoad"/></draw:frame></table:table-cell>
          <table:table-cell table:number-columns-repeated="5"/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="11"><table:table-cell table:number-columns-repeated="12"/></table:table-row>
        <table:table-row>
          <table:table-cell office:value-type="string"><text:p>No</text:p></table:table-cell>
          <table:table-cell office:value-type="string"><text:p>Name</text:p></table:table-cell>
          <table:table-cell office:value-type="string"><text:p>Spec</text:p></table:table-cell>
          <table:table-cell office:value-type="string"><text:p>Note</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="8"/>
        </table:table-row>
        <table:table-row>
          <table:table-cell/>
          <table:table-cell office:value-type="string"><text:p>Old chuck</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="10"/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="7"><table:table-cell table:number-columns-repeated="12"/></table:table-row>
        <table:table-row>
          <table:table-cell office:value-type="string"><text:p>Date</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="2"/>
          <table:table-cell office:value-type="string"><text:p>Kind</text:p></table:table-cell>
          <table:table-cell office:value-type="string"><text:p>History</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="2"/>
          <table:table-cell office:value-type="string"><text:p>Action</text:p></table:table-cell>
          <table:table-cell/>
          <table:table-cell office:value-type="string"><text:p>Vendor</text:p></table:table-cell>
          <table:table-cell office:value-type="string"><text:p>Hours</text:p></table:table-cell>
          <table:table-cell/>
        </table:table-row>
        <table:table-row>
          <table:table-cell office:value-type="string"><text:p>2019-01-01</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="3"/>
          <table:table-cell office:value-type="string"><text:p>stale entry</text:p></table:table-cell>
          <table:table-cell table:number-columns-repeated="7"/>
        </table:table-row>
        <table:table-row><table:table-cell table:number-columns-repeated="12"/></table:table-row>
        <table:table-row table:number-rows-repeated="10"><table:table-cell table:number-columns-repeated="12"/></table:table-row>
        <table:table-row>
          <table:table-cell><draw:frame draw:name="Logo" svg:width="2cm" svg:height="1cm"><draw:image xlink:href="Pictures/logo.png" xlink:type="simple" xlink:show="embed" xlink:actuate="onLoad"/></draw:frame></table:table-cell>
          <table:table-cell table:number-columns-repeated="11"/>
        </table:table-row>
        <table:table-row table:number-rows-repeated="960"><table:table-cell table:number-columns-repeated="12"/></table:table-row>
      </table:table>
    </office:spreadsheet>
  </office:body>
</office:document-content>"#
        .to_string()
}

/// Writes the template fixture as a real .ods file and returns a config whose
/// search path finds it.
pub fn workspace_with_template() -> (TempDir, ExportConfig) {
    let dir = tempfile::tempdir().expect("tempdir");
    let template_dir = dir.path().join("templates");
    std::fs::create_dir_all(&template_dir).expect("template dir");

    let mut package = OdsPackage::blank("Card");
    package.set_content_xml(template_content_xml());
    package
        .write_to(&template_dir.join("history_card_template.ods"))
        .expect("write template");

    let mut config = ExportConfig::with_root(dir.path());
    config.allow_blank_template = false;
    (dir, config)
}

pub fn read_content_xml(path: &Path) -> String {
    let file = File::open(path).expect("open ods");
    let mut zip = ZipArchive::new(file).expect("zip");
    let mut xml = String::new();
    zip.by_name("content.xml")
        .expect("content.xml")
        .read_to_string(&mut xml)
        .expect("read content");
    xml
}

pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = File::open(path).expect("open ods");
    let zip = ZipArchive::new(file).expect("zip");
    zip.file_names().map(|n| n.to_string()).collect()
}

pub fn read_manifest_xml(path: &Path) -> String {
    let file = File::open(path).expect("open ods");
    let mut zip = ZipArchive::new(file).expect("zip");
    let mut xml = String::new();
    zip.by_name("META-INF/manifest.xml")
        .expect("manifest")
        .read_to_string(&mut xml)
        .expect("read manifest");
    xml
}

pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

pub fn find_child_local<'a>(element: &'a Element, target: &str) -> Option<&'a Element> {
    element.children.iter().find_map(|n| match n {
        XMLNode::Element(e) if local_name(&e.name) == target => Some(e),
        _ => None,
    })
}

pub fn tables(content_xml: &str) -> Vec<Element> {
    let root = Element::parse(content_xml.as_bytes()).expect("parse content");
    let body = find_child_local(&root, "body").expect("body");
    let spreadsheet = find_child_local(body, "spreadsheet").expect("spreadsheet");
    spreadsheet
        .children
        .iter()
        .filter_map(|n| match n {
            XMLNode::Element(e) if local_name(&e.name) == "table" => Some(e.clone()),
            _ => None,
        })
        .collect()
}

pub fn table_name(table: &Element) -> String {
    table
        .attributes
        .iter()
        .find(|(k, _)| local_name(k) == "name")
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}

fn attr_repeat(element: &Element, local: &str) -> usize {
    element
        .attributes
        .iter()
        .find(|(k, _)| local_name(k) == local)
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .map(|n| n.max(1))
        .unwrap_or(1)
}

fn text_content(element: &Element) -> String {
    let mut out = String::new();
    for node in &element.children {
        match node {
            XMLNode::Text(t) => out.push_str(t),
            XMLNode::Element(e) => out.push_str(&text_content(e)),
            _ => {}
        }
    }
    out
}

fn cell_at<'a>(table: &'a Element, row1: u32, col1: u32) -> Option<&'a Element> {
    let mut row_cursor = 0u32;
    for node in &table.children {
        let row = match node {
            XMLNode::Element(e) if local_name(&e.name) == "table-row" => e,
            _ => continue,
        };
        let repeat = attr_repeat(row, "number-rows-repeated") as u32;
        if row1 - 1 < row_cursor + repeat {
            let mut col_cursor = 0u32;
            for cell_node in &row.children {
                let cell = match cell_node {
                    XMLNode::Element(e)
                        if matches!(local_name(&e.name), "table-cell" | "covered-table-cell") =>
                    {
                        e
                    }
                    _ => continue,
                };
                let cell_repeat = attr_repeat(cell, "number-columns-repeated") as u32;
                if col1 - 1 < col_cursor + cell_repeat {
                    return Some(cell);
                }
                col_cursor += cell_repeat;
            }
            return None;
        }
        row_cursor += repeat;
    }
    None
}

/// Concatenated paragraph text of a 1-based cell position.
pub fn cell_text(table: &Element, row1: u32, col1: u32) -> String {
    let Some(cell) = cell_at(table, row1, col1) else {
        return String::new();
    };
    cell.children
        .iter()
        .filter_map(|n| match n {
            XMLNode::Element(e) if local_name(&e.name) == "p" => Some(text_content(e)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn cell_attr(table: &Element, row1: u32, col1: u32, attr: &str) -> Option<String> {
    let cell = cell_at(table, row1, col1)?;
    cell.attributes
        .iter()
        .find(|(k, _)| local_name(k) == attr)
        .map(|(_, v)| v.clone())
}

/// (1-based row, frame name) of every draw:frame in the sheet.
pub fn frame_rows(table: &Element) -> Vec<(u32, String)> {
    let mut out = Vec::new();
    let mut row_cursor = 0u32;
    for node in &table.children {
        let row = match node {
            XMLNode::Element(e) if local_name(&e.name) == "table-row" => e,
            _ => continue,
        };
        let repeat = attr_repeat(row, "number-rows-repeated") as u32;
        for cell_node in &row.children {
            if let XMLNode::Element(cell) = cell_node {
                for child in &cell.children {
                    if let XMLNode::Element(frame) = child {
                        if local_name(&frame.name) == "frame" {
                            let name = frame
                                .attributes
                                .iter()
                                .find(|(k, _)| local_name(k) == "name")
                                .map(|(_, v)| v.clone())
                                .unwrap_or_default();
                            out.push((row_cursor + 1, name));
                        }
                    }
                }
            }
        }
        row_cursor += repeat;
    }
    out
}

#[derive(Default)]
pub struct MemoryRepo {
    pub records: HashMap<String, RecordAggregate>,
    pub photos: HashMap<String, String>,
}

impl EquipmentRepository for MemoryRepo {
    fn get(&self, code: &str) -> Result<Option<RecordAggregate>, ExportError> {
        Ok(self.records.get(code).cloned())
    }
}

impl PhotoRepository for MemoryRepo {
    fn resolve(&self, code: &str) -> Option<String> {
        self.photos.get(code).cloned()
    }
}

pub fn sample_record(code: &str, name: &str) -> RecordAggregate {
    RecordAggregate {
        code: code.to_string(),
        name: Some(name.to_string()),
        model: Some("HX-250".to_string()),
        size: Some("1200x800".to_string()),
        voltage: Some("380V".to_string()),
        power_kw: Some(7.5),
        maker: Some("Hanbit Machinery".to_string()),
        maker_phone: Some("02-1234-5678".to_string()),
        intake: Some(equipcard::IntakeDate {
            year: 2018,
            month: Some(4),
            day: None,
        }),
        purchase_price: Some("12,500,000".to_string()),
        location: Some("Plant 2".to_string()),
        purpose: Some("Rough milling".to_string()),
        note: Some("Second overhaul due".to_string()),
        history: Vec::new(),
        accessories: vec![Accessory {
            name: Some("Vise".to_string()),
            spec: Some("6 inch".to_string()),
            note: None,
        }],
        photo_path: None,
    }
}

pub fn history_entry(id: i64, date: &str, title: &str) -> HistoryEntry {
    HistoryEntry {
        id,
        date: date.parse().expect("date"),
        kind: Some("repair".to_string()),
        title: Some(title.to_string()),
        detail: Some("replaced".to_string()),
        vendor: Some("ACME service".to_string()),
        hours: Some(3.5),
    }
}

/// Small solid-color PNG on disk, for photo tests.
pub fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 40]));
    img.save(path).expect("write png");
}

pub fn new_out_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}
