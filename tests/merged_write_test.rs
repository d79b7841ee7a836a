mod common;

use equipcard::ods::content_dom::{CellValue, ContentDom};
use equipcard::ods::sheet_grid::SheetGrid;
use equipcard::ods::writer::write_cell;

/// One 2x2 merge at B2:C3 and one 1x3 merge at A5:C5.
fn merged_fixture() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2">
  <office:body>
    <office:spreadsheet>
      <table:table table:name="Merges">
        <table:table-row><table:table-cell table:number-columns-repeated="4"/></table:table-row>
        <table:table-row>
          <table:table-cell/>
          <table:table-cell table:number-rows-spanned="2" table:number-columns-spanned="2"/>
          <table:covered-table-cell/>
          <table:table-cell/>
        </table:table-row>
        <table:table-row>
          <table:table-cell/>
          <table:covered-table-cell table:number-columns-repeated="2"/>
          <table:table-cell/>
        </table:table-row>
        <table:table-row><table:table-cell table:number-columns-repeated="4"/></table:table-row>
        <table:table-row>
          <table:table-cell table:number-columns-spanned="3" table:number-rows-spanned="1"/>
          <table:covered-table-cell table:number-columns-repeated="2"/>
          <table:table-cell/>
        </table:table-row>
      </table:table>
    </office:spreadsheet>
  </office:body>
</office:document-content>"#
}

#[test]
fn scan_discovers_both_regions() {
    let dom = ContentDom::parse(merged_fixture()).expect("parse");
    let grid = SheetGrid::scan(dom.table(0).expect("table"), 16, 16);

    assert_eq!(grid.merges.len(), 2);
    assert_eq!(grid.resolve_write_anchor(2, 2), (2, 2));
    assert_eq!(grid.resolve_write_anchor(3, 3), (2, 2));
    assert_eq!(grid.resolve_write_anchor(2, 3), (2, 2));
    assert_eq!(grid.resolve_write_anchor(5, 3), (5, 1));
    assert_eq!(grid.resolve_write_anchor(1, 1), (1, 1));
}

#[test]
fn write_inside_two_by_two_region_lands_on_anchor() {
    let mut dom = ContentDom::parse(merged_fixture()).expect("parse");
    let grid = SheetGrid::scan(dom.table(0).expect("table"), 16, 16);

    let table = dom.table_mut(0).expect("table");
    let wrote = write_cell(table, &grid, 3, 3, &CellValue::String("hit".to_string()))
        .expect("write");
    assert!(wrote);

    let xml = dom.to_xml().expect("serialize");
    let tables = common::tables(&xml);
    assert_eq!(common::cell_text(&tables[0], 2, 2), "hit");
    assert_eq!(common::cell_text(&tables[0], 3, 3), "");
}

#[test]
fn write_inside_one_by_n_region_lands_on_anchor() {
    let mut dom = ContentDom::parse(merged_fixture()).expect("parse");
    let grid = SheetGrid::scan(dom.table(0).expect("table"), 16, 16);

    let table = dom.table_mut(0).expect("table");
    write_cell(table, &grid, 5, 2, &CellValue::String("wide".to_string())).expect("write");

    let xml = dom.to_xml().expect("serialize");
    let tables = common::tables(&xml);
    assert_eq!(common::cell_text(&tables[0], 5, 1), "wide");
}

#[test]
fn write_outside_any_region_is_identity() {
    let mut dom = ContentDom::parse(merged_fixture()).expect("parse");
    let grid = SheetGrid::scan(dom.table(0).expect("table"), 16, 16);

    let table = dom.table_mut(0).expect("table");
    write_cell(table, &grid, 1, 4, &CellValue::Number(8.0)).expect("write");

    let xml = dom.to_xml().expect("serialize");
    let tables = common::tables(&xml);
    assert_eq!(common::cell_text(&tables[0], 1, 4), "8");
    assert_eq!(
        common::cell_attr(&tables[0], 1, 4, "value-type").as_deref(),
        Some("float")
    );
}

#[test]
fn writes_far_below_existing_rows_pad_the_sheet() {
    let mut dom = ContentDom::parse(merged_fixture()).expect("parse");
    let grid = SheetGrid::scan(dom.table(0).expect("table"), 16, 16);

    let table = dom.table_mut(0).expect("table");
    write_cell(table, &grid, 40, 2, &CellValue::String("deep".to_string())).expect("write");

    let xml = dom.to_xml().expect("serialize");
    let tables = common::tables(&xml);
    assert_eq!(common::cell_text(&tables[0], 40, 2), "deep");
    assert_eq!(common::cell_text(&tables[0], 39, 2), "");
}

#[test]
fn style_attributes_survive_value_writes() {
    let fixture = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2">
  <office:body>
    <office:spreadsheet>
      <table:table table:name="Styles">
        <table:table-row>
          <table:table-cell table:style-name="ce9" office:value-type="string"><text:p>before</text:p></table:table-cell>
        </table:table-row>
      </table:table>
    </office:spreadsheet>
  </office:body>
</office:document-content>"#;

    let mut dom = ContentDom::parse(fixture).expect("parse");
    let grid = SheetGrid::scan(dom.table(0).expect("table"), 4, 4);
    let table = dom.table_mut(0).expect("table");
    write_cell(table, &grid, 1, 1, &CellValue::String("after".to_string())).expect("write");

    let xml = dom.to_xml().expect("serialize");
    let tables = common::tables(&xml);
    assert_eq!(common::cell_text(&tables[0], 1, 1), "after");
    assert_eq!(
        common::cell_attr(&tables[0], 1, 1, "style-name").as_deref(),
        Some("ce9")
    );
}
