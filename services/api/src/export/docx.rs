//! services/api/src/export/docx.rs
//!
//! DOCX projection: document title as a heading, then one heading plus
//! body paragraphs per section.

use docsmith_core::domain::Section;
use docx_rs::{Docx, Paragraph, Run};

use super::ExportError;

// Run sizes are half-points: 48 = 24pt title, 32 = 16pt section heading.
const TITLE_SIZE: usize = 48;
const HEADING_SIZE: usize = 32;

pub(super) fn render(title: &str, sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(title).size(TITLE_SIZE).bold()),
    );

    for section in sections {
        docx = docx.add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(section.heading.as_str())
                    .size(HEADING_SIZE)
                    .bold(),
            ),
        );
        // One paragraph per line; a run must not carry raw newlines.
        for line in section.text.lines() {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }
    }

    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Build("DOCX", e.to_string()))?;
    Ok(buffer.into_inner())
}
