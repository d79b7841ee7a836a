pub mod cell_address;
pub mod content_dom;
pub mod manifest;
pub mod ods_file;
pub mod ods_templates;
pub mod sheet_grid;
pub mod writer;
