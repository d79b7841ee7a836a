use crate::common::errors::ExportError;
use crate::ods::content_dom::{attr_by_local, local_name};
use xmltree::{Element, EmitterConfig, XMLNode};

pub struct Manifest;

impl Manifest {
    pub fn minimal_manifest_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
  <manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="styles.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="meta.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="settings.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#
    }

    /// Registers an added package part, leaving already-listed paths alone.
    pub fn with_entry(
        manifest_xml: &str,
        full_path: &str,
        media_type: &str,
    ) -> Result<String, ExportError> {
        let mut root = Element::parse(manifest_xml.as_bytes())?;

        let already_listed = root.children.iter().any(|n| match n {
            XMLNode::Element(e) if local_name(&e.name) == "file-entry" => {
                attr_by_local(e, "full-path") == Some(full_path)
            }
            _ => false,
        });
        if !already_listed {
            let mut entry = Element::new("manifest:file-entry");
            entry
                .attributes
                .insert("manifest:full-path".to_string(), full_path.to_string());
            entry
                .attributes
                .insert("manifest:media-type".to_string(), media_type.to_string());
            root.children.push(XMLNode::Element(entry));
        }

        let mut out = Vec::new();
        root.write_with_config(
            &mut out,
            EmitterConfig::new()
                .perform_indent(true)
                .write_document_declaration(true),
        )?;
        String::from_utf8(out).map_err(|e| ExportError::XmlParseError(e.to_string()))
    }
}
