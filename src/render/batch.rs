use crate::common::errors::ExportError;
use crate::config::ExportConfig;
use crate::ods::content_dom::ContentDom;
use crate::ods::ods_file::OdsPackage;
use crate::record::RecordAggregate;
use crate::render::renderer::{CardRenderer, RenderOptions, RenderReport};
use crate::template::TemplateLocator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Characters spreadsheet applications refuse inside sheet names.
const TITLE_BAD_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const TITLE_MAX_CHARS: usize = 31;

/// Tracks assigned sheet titles and guarantees uniqueness by appending
/// " (n)" on collision.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    used: HashSet<String>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an existing title as taken without sanitizing it.
    pub fn reserve(&mut self, title: &str) {
        self.used.insert(title.to_string());
    }

    pub fn claim(&mut self, base: &str) -> String {
        let name = sanitize_sheet_title(base);
        if self.used.insert(name.clone()) {
            return name;
        }
        let mut n = 2usize;
        loop {
            let suffix = format!(" ({n})");
            let room = TITLE_MAX_CHARS.saturating_sub(suffix.chars().count());
            let trimmed: String = name.chars().take(room).collect();
            let candidate = format!("{trimmed}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

pub fn sanitize_sheet_title(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !TITLE_BAD_CHARS.contains(c))
        .take(TITLE_MAX_CHARS)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Code,
    Name,
}

/// Drops blank entries and duplicates, keeping first-occurrence order.
pub fn dedup_codes(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_string()))
        .map(|c| c.to_string())
        .collect()
}

/// Rendering order: sort key first, code as tiebreaker.
pub fn sort_records(records: &mut [RecordAggregate], key: SortKey) {
    match key {
        SortKey::Code => records.sort_by(|a, b| a.code.cmp(&b.code)),
        SortKey::Name => records.sort_by(|a, b| {
            let an = a.name.clone().unwrap_or_default();
            let bn = b.name.clone().unwrap_or_default();
            (an, &a.code).cmp(&(bn, &b.code))
        }),
    }
}

/// Applies the caller's title format, else name, else code.
pub fn preferred_title(format: Option<&str>, code: &str, name: Option<&str>) -> String {
    let name = name.unwrap_or("");
    let base = match format {
        Some(fmt) => fmt.replace("{code}", code).replace("{name}", name),
        None => {
            if name.trim().is_empty() {
                code.to_string()
            } else {
                name.to_string()
            }
        }
    };
    if base.trim().is_empty() {
        "Card".to_string()
    } else {
        base
    }
}

/// Renders one or many records into a single document. The first record fills
/// the template's primary sheet; every further record fills a structural clone
/// of the unfilled primary sheet captured before any rendering.
pub struct BatchExporter<'a> {
    config: &'a ExportConfig,
}

impl<'a> BatchExporter<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// First existing template wins; a blank single-sheet document stands in
    /// when allowed, otherwise the export fails here and only here.
    pub fn load_template(&self, explicit: Option<&Path>) -> Result<OdsPackage, ExportError> {
        let locator = TemplateLocator::new(&self.config.template_dirs, &self.config.template_file);
        match locator.locate(explicit) {
            Some(path) => {
                info!(template = %path.display(), "template resolved");
                OdsPackage::load(&path)
            }
            None if self.config.allow_blank_template => {
                info!("no template found, starting from a blank document");
                Ok(OdsPackage::blank("Card"))
            }
            None => Err(ExportError::TemplateNotFound(locator.describe_search())),
        }
    }

    pub fn render_into(
        &self,
        package: &mut OdsPackage,
        records: &[RecordAggregate],
        base_opts: &RenderOptions,
        title_format: Option<&str>,
    ) -> Result<Vec<RenderReport>, ExportError> {
        if records.is_empty() {
            return Err(ExportError::InvalidInput(
                "no records to render".to_string(),
            ));
        }

        let content = package.content_xml()?;
        let mut dom = ContentDom::parse(&content)?;
        let original_count = dom.table_count();
        if original_count == 0 {
            return Err(ExportError::InvalidPackage(
                "document has no sheets".to_string(),
            ));
        }

        // Capture the pristine primary sheet before anything is written, so
        // later items never clone rendered content.
        let pristine = dom.clone_table(0)?;
        for _ in 1..records.len() {
            dom.append_table(pristine.clone())?;
        }

        let mut titles = TitleRegistry::new();
        let names = dom.table_names()?;
        for name in names.iter().take(original_count).skip(1) {
            titles.reserve(name);
        }

        let renderer = CardRenderer::new(self.config);
        let mut reports = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let sheet_index = if i == 0 { 0 } else { original_count + i - 1 };
            let opts = RenderOptions {
                preferred_title: Some(preferred_title(
                    title_format,
                    &record.code,
                    record.name.as_deref(),
                )),
                ..base_opts.clone()
            };
            let report = renderer.render(&mut dom, sheet_index, package, record, &opts, &mut titles)?;
            reports.push(report);
        }

        package.set_content_xml(dom.to_xml()?);
        Ok(reports)
    }
}
