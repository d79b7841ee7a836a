use crate::common::errors::ExportError;
use crate::ods::manifest::Manifest;
use crate::ods::ods_templates::OdsTemplates;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// In-memory ODS zip package. Entries the engine does not understand (styles,
/// settings, existing pictures) are carried through untouched; only
/// content.xml, the manifest and added pictures change between load and save.
pub struct OdsPackage {
    entries: BTreeMap<String, Vec<u8>>,
}

impl OdsPackage {
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let file = File::open(path)?;
        let mut zip = ZipArchive::new(file)?;
        let mut entries = BTreeMap::new();

        for i in 0..zip.len() {
            let mut entry = zip.by_index(i)?;
            let name = entry.name().to_string();
            if name.ends_with('/') {
                continue;
            }
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;
            entries.insert(name, bytes);
        }

        let package = Self { entries };
        let mimetype = package
            .entries
            .get("mimetype")
            .map(|b| String::from_utf8_lossy(b).trim().to_string())
            .unwrap_or_default();
        if mimetype != OdsTemplates::mimetype() {
            return Err(ExportError::InvalidPackage("invalid mimetype".to_string()));
        }
        Ok(package)
    }

    /// Minimal valid document with one empty sheet.
    pub fn blank(initial_sheet_name: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "mimetype".to_string(),
            OdsTemplates::mimetype().as_bytes().to_vec(),
        );
        entries.insert(
            "content.xml".to_string(),
            OdsTemplates::content_xml(initial_sheet_name).into_bytes(),
        );
        entries.insert(
            "styles.xml".to_string(),
            OdsTemplates::styles_xml().as_bytes().to_vec(),
        );
        entries.insert(
            "meta.xml".to_string(),
            OdsTemplates::meta_xml().as_bytes().to_vec(),
        );
        entries.insert(
            "settings.xml".to_string(),
            OdsTemplates::settings_xml().as_bytes().to_vec(),
        );
        entries.insert(
            "META-INF/manifest.xml".to_string(),
            OdsTemplates::manifest_xml().as_bytes().to_vec(),
        );
        Self { entries }
    }

    pub fn content_xml(&self) -> Result<String, ExportError> {
        let bytes = self
            .entries
            .get("content.xml")
            .ok_or_else(|| ExportError::InvalidPackage("missing content.xml".to_string()))?;
        String::from_utf8(bytes.clone())
            .map_err(|e| ExportError::InvalidPackage(format!("content.xml not utf-8: {e}")))
    }

    pub fn set_content_xml(&mut self, xml: String) {
        self.entries.insert("content.xml".to_string(), xml.into_bytes());
    }

    /// Stores picture bytes under `Pictures/` and lists them in the manifest.
    /// Returns the href to reference from a frame.
    pub fn add_picture(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        media_type: &str,
    ) -> Result<String, ExportError> {
        let full_path = format!("Pictures/{file_name}");
        self.entries.insert(full_path.clone(), bytes);

        if let Some(manifest) = self.entries.get("META-INF/manifest.xml") {
            let manifest_xml = String::from_utf8_lossy(manifest).to_string();
            let patched = Manifest::with_entry(&manifest_xml, &full_path, media_type)?;
            self.entries
                .insert("META-INF/manifest.xml".to_string(), patched.into_bytes());
        }
        Ok(full_path)
    }

    /// Writes the package. "mimetype" must come first and stored uncompressed;
    /// the remaining entries follow in sorted order, deflated.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let out = File::create(path)?;
        let mut writer = ZipWriter::new(out);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("mimetype", stored)?;
        let mimetype = self
            .entries
            .get("mimetype")
            .cloned()
            .unwrap_or_else(|| OdsTemplates::mimetype().as_bytes().to_vec());
        writer.write_all(&mimetype)?;

        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in &self.entries {
            if name == "mimetype" {
                continue;
            }
            writer.start_file(name.as_str(), deflated)?;
            writer.write_all(bytes)?;
        }

        writer.finish()?;
        Ok(())
    }
}
