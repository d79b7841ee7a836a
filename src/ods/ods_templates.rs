use crate::ods::manifest::Manifest;

/// Static parts for the blank fallback document used when no template file
/// resolves and blank output is permitted.
pub struct OdsTemplates;

impl OdsTemplates {
    // MIME string checked by spreadsheet apps before parsing XML.
    pub fn mimetype() -> &'static str {
        "application/vnd.oasis.opendocument.spreadsheet"
    }

    pub fn meta_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" office:version="1.2">
  <office:meta/>
</office:document-meta>"#
    }

    pub fn styles_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" office:version="1.2">
  <office:styles/>
</office:document-styles>"#
    }

    pub fn settings_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-settings xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" office:version="1.2">
  <office:settings/>
</office:document-settings>"#
    }

    pub fn manifest_xml() -> &'static str {
        Manifest::minimal_manifest_xml()
    }

    /// One empty sheet. The draw/svg/xlink namespaces are declared up front so
    /// photo frames can be inserted later without touching the root element.
    pub fn content_xml(initial_sheet_name: &str) -> String {
        let name = quick_xml::escape::escape(initial_sheet_name);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" xmlns:svg="urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:calcext="urn:org:documentfoundation:names:experimental:calc:xmlns:calcext:1.0" office:version="1.2">
  <office:body>
    <office:spreadsheet>
      <table:table table:name="{name}">
        <table:table-row>
          <table:table-cell/>
        </table:table-row>
      </table:table>
    </office:spreadsheet>
  </office:body>
</office:document-content>"#
        )
    }
}
