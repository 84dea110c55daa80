//! services/api/src/export/pdf.rs
//!
//! PDF projection: manual text flow onto A4 pages. Lines are wrapped to
//! the margin width and a new page starts when vertical space runs out.

use docsmith_core::domain::Section;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use std::io::Cursor;

use super::ExportError;

// A4 portrait in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 14;
const TITLE_SIZE: i64 = 16;
const HEADING_SIZE: i64 = 12;
const BODY_SIZE: i64 = 11;
/// Wrap budget for 11pt Helvetica inside the margins.
const MAX_LINE_CHARS: usize = 90;

const FONT_BODY: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Accumulates per-page content operations while tracking the vertical
/// cursor.
struct PageFlow {
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        self.finished.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Breaks the page unless at least `needed` points remain above the
    /// bottom margin.
    fn ensure_room(&mut self, needed: i64) {
        if self.y < MARGIN + needed {
            self.break_page();
        }
    }

    fn line(&mut self, font: &'static str, size: i64, text: &str) {
        self.ensure_room(LINE_HEIGHT);
        self.current.push(Operation::new("BT", vec![]));
        self.current
            .push(Operation::new("Tf", vec![font.into(), size.into()]));
        self.current
            .push(Operation::new("Td", vec![MARGIN.into(), self.y.into()]));
        self.current.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_text(text))],
        ));
        self.current.push(Operation::new("ET", vec![]));
        self.y -= LINE_HEIGHT;
    }

    fn space(&mut self, amount: i64) {
        self.y -= amount;
    }

    fn into_pages(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(self.current);
        }
        self.finished
    }
}

/// The built-in Type1 fonts are byte-addressed; anything outside that
/// range is substituted rather than emitted as a multi-byte sequence.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if cp < 256 {
                cp as u8
            } else {
                b'?'
            }
        })
        .collect()
}

/// Greedy word wrap; words longer than the budget are hard-split.
fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            wrapped.push(std::mem::take(&mut current));
        }
        if word.len() > max_chars {
            let mut rest: &str = word;
            while rest.len() > max_chars {
                let split_at = rest
                    .char_indices()
                    .take_while(|(i, _)| *i <= max_chars)
                    .last()
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                wrapped.push(rest[..split_at].to_string());
                rest = &rest[split_at..];
            }
            current = rest.to_string();
            continue;
        }
        if current.is_empty() {
            current = word.to_string();
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }
    wrapped
}

pub(super) fn render(title: &str, sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    let mut flow = PageFlow::new();

    flow.line(FONT_BOLD, TITLE_SIZE, title);
    flow.space(16);

    for section in sections {
        // Keep a heading from landing alone at the very bottom of a page.
        flow.ensure_room(LINE_HEIGHT * 3);
        flow.line(FONT_BOLD, HEADING_SIZE, &section.heading);
        flow.space(4);
        for raw_line in section.text.lines() {
            for piece in wrap_line(raw_line, MAX_LINE_CHARS) {
                flow.line(FONT_BODY, BODY_SIZE, &piece);
            }
        }
        flow.space(10);
    }

    build_document(flow.into_pages())
}

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_body = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_BODY => font_body,
            FONT_BOLD => font_bold,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Build("PDF", e.to_string()))?;
        let stream_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => stream_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Cursor::new(Vec::new());
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Build("PDF", e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_the_budget() {
        let wrapped = wrap_line("aaa bbb ccc ddd", 7);
        assert_eq!(wrapped, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn wrap_hard_splits_oversized_words() {
        let wrapped = wrap_line("abcdefghij", 4);
        assert!(wrapped.iter().all(|piece| piece.len() <= 4));
        assert_eq!(wrapped.concat(), "abcdefghij");
    }

    #[test]
    fn empty_line_stays_a_line() {
        assert_eq!(wrap_line("", 10), vec![String::new()]);
    }

    #[test]
    fn long_documents_paginate() {
        let body = (0..200)
            .map(|i| format!("Line number {i} of a fairly long body."))
            .collect::<Vec<_>>()
            .join("\n");
        let section = Section {
            id: uuid::Uuid::new_v4(),
            document_id: uuid::Uuid::new_v4(),
            position: 0,
            heading: "Page 1".to_string(),
            text: body,
            last_feedback: None,
        };

        let mut flow = PageFlow::new();
        flow.line(FONT_BOLD, TITLE_SIZE, "Title");
        for raw_line in section.text.lines() {
            for piece in wrap_line(raw_line, MAX_LINE_CHARS) {
                flow.line(FONT_BODY, BODY_SIZE, &piece);
            }
        }
        let pages = flow.into_pages();
        assert!(pages.len() > 1, "200 lines must not fit one A4 page");
    }

    #[test]
    fn non_latin_text_is_substituted_not_dropped() {
        assert_eq!(encode_text("a…b"), vec![b'a', b'?', b'b']);
    }
}
