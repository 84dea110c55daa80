//! services/api/src/export/mod.rs
//!
//! Deterministic projection of an ordered section list into the three
//! download formats. Each format sits behind a cargo feature; a build
//! without the backing library reports the format as unavailable instead
//! of producing a partial file.

#[cfg(feature = "export-docx")]
mod docx;
#[cfg(feature = "export-pdf")]
mod pdf;
#[cfg(feature = "export-pptx")]
mod pptx;

use docsmith_core::domain::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pptx,
    Pdf,
}

impl ExportFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Docx => "DOCX",
            Self::Pptx => "PPTX",
            Self::Pdf => "PDF",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Pdf => "application/pdf",
        }
    }

    /// Whether this format's backing library is compiled in.
    pub fn available(self) -> bool {
        match self {
            Self::Docx => cfg!(feature = "export-docx"),
            Self::Pptx => cfg!(feature = "export-pptx"),
            Self::Pdf => cfg!(feature = "export-pdf"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{0} export not available (support not compiled in)")]
    Unavailable(&'static str),
    #[error("failed to build {0} file: {1}")]
    Build(&'static str, String),
}

/// Renders the document as a complete file in the requested format.
/// A document with zero sections still yields a valid file with the title.
pub fn render(
    format: ExportFormat,
    title: &str,
    sections: &[Section],
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Docx => render_docx(title, sections),
        ExportFormat::Pptx => render_pptx(title, sections),
        ExportFormat::Pdf => render_pdf(title, sections),
    }
}

#[cfg(feature = "export-docx")]
fn render_docx(title: &str, sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    docx::render(title, sections)
}
#[cfg(not(feature = "export-docx"))]
fn render_docx(_title: &str, _sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unavailable(ExportFormat::Docx.label()))
}

#[cfg(feature = "export-pptx")]
fn render_pptx(title: &str, sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    pptx::render(title, sections)
}
#[cfg(not(feature = "export-pptx"))]
fn render_pptx(_title: &str, _sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unavailable(ExportFormat::Pptx.label()))
}

#[cfg(feature = "export-pdf")]
fn render_pdf(title: &str, sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    pdf::render(title, sections)
}
#[cfg(not(feature = "export-pdf"))]
fn render_pdf(_title: &str, _sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    Err(ExportError::Unavailable(ExportFormat::Pdf.label()))
}

/// Derives a download filename from the document title: keep alphanumeric,
/// space, underscore and hyphen; fall back to "document" when nothing is
/// left.
pub fn safe_filename(title: &str, extension: &str) -> String {
    let base: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let base = base.trim();
    let base = if base.is_empty() { "document" } else { base };
    format!("{base}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsmith_core::domain::Section;
    use uuid::Uuid;

    fn section(position: i64, heading: &str, text: &str) -> Section {
        Section {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            position,
            heading: heading.to_string(),
            text: text.to_string(),
            last_feedback: None,
        }
    }

    fn sample_sections() -> Vec<Section> {
        vec![
            section(0, "Page 1", "First sentence. Second sentence!"),
            section(1, "Page 2", "Another page of text. It has two sentences."),
        ]
    }

    #[test]
    fn filename_is_sanitized() {
        assert_eq!(safe_filename("My Report: v2/final", "docx"), "My Report v2final.docx");
        assert_eq!(safe_filename("under_score-ok 1", "pdf"), "under_score-ok 1.pdf");
        assert_eq!(safe_filename("///", "pptx"), "document.pptx");
        assert_eq!(safe_filename("", "docx"), "document.docx");
    }

    #[test]
    fn format_parsing_is_case_insensitive() {
        assert_eq!(ExportFormat::parse("DOCX"), Some(ExportFormat::Docx));
        assert_eq!(ExportFormat::parse("pdf"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("odt"), None);
    }

    #[cfg(feature = "export-docx")]
    #[test]
    fn docx_renders_a_zip_package() {
        let bytes = render(ExportFormat::Docx, "Title", &sample_sections()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[cfg(feature = "export-docx")]
    #[test]
    fn docx_with_zero_sections_is_still_valid() {
        let bytes = render(ExportFormat::Docx, "Only a Title", &[]).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[cfg(feature = "export-pdf")]
    #[test]
    fn pdf_has_the_pdf_magic() {
        let bytes = render(ExportFormat::Pdf, "Title", &sample_sections()).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");

        let empty = render(ExportFormat::Pdf, "Only a Title", &[]).unwrap();
        assert_eq!(&empty[..5], b"%PDF-");
    }

    #[cfg(feature = "export-pptx")]
    #[test]
    fn pptx_contains_one_slide_per_non_empty_section() {
        use std::io::Cursor;

        let mut sections = sample_sections();
        sections.push(section(2, "Empty", "   "));

        let bytes = render(ExportFormat::Pptx, "Deck & Title", &sections).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"[Content_Types].xml".to_string()));
        assert!(names.contains(&"ppt/presentation.xml".to_string()));
        // Title slide + two non-empty sections; the blank section is skipped.
        assert!(names.contains(&"ppt/slides/slide3.xml".to_string()));
        assert!(!names.contains(&"ppt/slides/slide4.xml".to_string()));

        // The ampersand in the title must be escaped in the slide XML.
        use std::io::Read;
        let mut slide1 = String::new();
        archive.by_name("ppt/slides/slide1.xml").unwrap().read_to_string(&mut slide1).unwrap();
        assert!(slide1.contains("Deck &amp; Title"));
    }

    #[cfg(feature = "export-pptx")]
    #[test]
    fn pptx_with_zero_sections_has_only_the_title_slide() {
        use std::io::Cursor;

        let bytes = render(ExportFormat::Pptx, "Only a Title", &[]).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("ppt/slides/slide1.xml").is_ok());
        assert!(archive.by_name("ppt/slides/slide2.xml").is_err());
    }
}
