//! DOCX template materializer
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! The placeholder is a bookmark:
//!
//! ```text
//! <w:bookmarkStart w:id="0" w:name="document_number"/>
//!   <w:r><w:rPr>..</w:rPr><w:t>000</w:t></w:r>
//! <w:bookmarkEnd w:id="0"/>
//! ```
//!
//! Everything between the two markers is replaced by one run holding the
//! new text, keeping the first run's formatting. All other archive entries
//! are copied byte-for-byte.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use shared::{DocumentIdentifier, util};
use tracing::{info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::materializer::{MaterializeError, MaterializeResult, Materializer, verify_artifact};

/// Archive entry holding the document body
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Default bookmark receiving the number
pub const DEFAULT_PLACEHOLDER: &str = "document_number";

/// Default artifact file name prefix
pub const DEFAULT_ARTIFACT_PREFIX: &str = "Contract";

/// Materializer writing into a DOCX bookmark
#[derive(Debug, Clone)]
pub struct DocxMaterializer {
    template: PathBuf,
    output_dir: PathBuf,
    placeholder: String,
    artifact_prefix: String,
}

impl DocxMaterializer {
    pub fn new(template: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output_dir: output_dir.into(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
        }
    }

    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder = name.into();
        self
    }

    pub fn with_artifact_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.artifact_prefix = prefix.into();
        self
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    /// `{prefix}_{identifier}_{YYYYMMDD_HHMMSS}.docx` inside the output dir
    pub fn artifact_path(&self, identifier: &DocumentIdentifier, at: NaiveDateTime) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}_{}.docx",
            self.artifact_prefix,
            identifier,
            util::timestamp(at)
        ))
    }

    /// Fill the template and save it to `target`
    pub fn render_to(&self, text: &str, target: &Path) -> MaterializeResult<()> {
        if !self.template.is_file() {
            return Err(MaterializeError::TemplateNotFound(self.template.clone()));
        }

        let mut archive = ZipArchive::new(File::open(&self.template)?)?;
        let body = read_document_part(&mut archive)?;
        let filled = fill_bookmark(&body, &self.placeholder, text)?;

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Written beside the target, renamed into place once complete
        let tmp = tmp_path(target);
        if let Err(e) = write_archive(&mut archive, &filled, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp, target) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(())
    }
}

fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Copy every entry of `archive` to `path`, with the body replaced by `body`
fn write_archive(archive: &mut ZipArchive<File>, body: &str, path: &Path) -> MaterializeResult<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.name() == DOCUMENT_PART {
            writer.start_file(DOCUMENT_PART, options)?;
            writer.write_all(body.as_bytes())?;
        } else {
            writer.raw_copy_file(entry)?;
        }
    }
    writer.finish()?;
    Ok(())
}

impl Materializer for DocxMaterializer {
    #[instrument(skip(self), fields(template = %self.template.display()))]
    fn materialize(&mut self, identifier: &DocumentIdentifier) -> MaterializeResult<PathBuf> {
        let target = self.artifact_path(identifier, util::now_local());
        let text = identifier.number().to_string();

        self.render_to(&text, &target)?;
        info!(placeholder = %self.placeholder, value = %text, "Placeholder updated");

        let size = verify_artifact(&target)?;
        info!(path = %target.display(), bytes = size, "Artifact saved");

        Ok(target)
    }
}

fn read_document_part(archive: &mut ZipArchive<File>) -> MaterializeResult<String> {
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| MaterializeError::InvalidTemplate(format!("missing {}", DOCUMENT_PART)))?;

    let mut body = String::new();
    entry
        .read_to_string(&mut body)
        .map_err(|e| MaterializeError::InvalidTemplate(format!("{}: {}", DOCUMENT_PART, e)))?;
    Ok(body)
}

/// Replace the content of bookmark `name` with a single text run
pub fn fill_bookmark(xml: &str, name: &str, text: &str) -> MaterializeResult<String> {
    let (content_start, id) = find_bookmark_start(xml, name)
        .ok_or_else(|| MaterializeError::PlaceholderMissing(name.to_string()))?;
    let content_end = find_bookmark_end(xml, content_start, id)
        .ok_or_else(|| MaterializeError::PlaceholderMissing(name.to_string()))?;

    let inner = &xml[content_start..content_end];
    if inner.contains("</w:p>") {
        return Err(MaterializeError::UnsupportedPlaceholder(name.to_string()));
    }

    let run_props = inner
        .find("<w:rPr>")
        .and_then(|s| inner[s..].find("</w:rPr>").map(|e| &inner[s..s + e + "</w:rPr>".len()]))
        .unwrap_or("");

    let mut out = String::with_capacity(xml.len() + text.len());
    out.push_str(&xml[..content_start]);
    out.push_str("<w:r>");
    out.push_str(run_props);
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape_xml(text));
    out.push_str("</w:t></w:r>");
    out.push_str(&xml[content_end..]);
    Ok(out)
}

/// Byte offset just past the matching `<w:bookmarkStart .../>`, and its id
fn find_bookmark_start<'a>(xml: &'a str, name: &str) -> Option<(usize, &'a str)> {
    let mut from = 0;
    while let Some(rel) = xml[from..].find("<w:bookmarkStart") {
        let start = from + rel;
        let end = start + xml[start..].find('>')? + 1;
        let tag = &xml[start..end];
        if attribute(tag, "w:name") == Some(name) {
            return Some((end, attribute(tag, "w:id")?));
        }
        from = end;
    }
    None
}

/// Byte offset of the `<w:bookmarkEnd>` with `id`, searching from `from`
fn find_bookmark_end(xml: &str, mut from: usize, id: &str) -> Option<usize> {
    while let Some(rel) = xml[from..].find("<w:bookmarkEnd") {
        let start = from + rel;
        let end = start + xml[start..].find('>')? + 1;
        if attribute(&xml[start..end], "w:id") == Some(id) {
            return Some(start);
        }
        from = end;
    }
    None
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
