//! services/api/src/export/pptx.rs
//!
//! PPTX projection. A .pptx file is a zip package of OOXML parts; this
//! module assembles the minimal part set (presentation, one master, one
//! layout, one theme, slides) directly. Slide one carries the document
//! title; every non-empty section becomes a content slide whose body is
//! sentence-split into bullet-style paragraphs.

use docsmith_core::domain::Section;
use docsmith_core::fallback::split_sentences;
use quick_xml::escape::escape;
use std::io::{Cursor, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::ExportError;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

// Title color 0,70,140 and body color 40,40,40, as in the reference deck.
const TITLE_COLOR: &str = "00468C";
const BODY_COLOR: &str = "282828";

const PACKAGE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

const SLIDE_MASTER: &str = r#"<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const SLIDE_MASTER_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const SLIDE_LAYOUT: &str = r#"<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const SLIDE_LAYOUT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const SLIDE_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/></Relationships>"#;

const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

/// One slide's worth of content: a title line plus body paragraphs.
struct Slide {
    title: String,
    title_size: u32,
    bullets: bool,
    body: Vec<String>,
}

pub(super) fn render(title: &str, sections: &[Section]) -> Result<Vec<u8>, ExportError> {
    let mut slides = vec![Slide {
        title: title.to_string(),
        title_size: 3600,
        bullets: false,
        body: vec!["Generated with the AI document assistant".to_string()],
    }];

    for section in sections {
        let text = section.text.trim();
        if text.is_empty() {
            continue;
        }
        slides.push(Slide {
            title: section.heading.clone(),
            title_size: 3000,
            bullets: true,
            body: split_sentences(text),
        });
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    write_part(&mut zip, "[Content_Types].xml", &content_types(slides.len()))?;
    write_part(&mut zip, "_rels/.rels", &with_header(PACKAGE_RELS))?;
    write_part(&mut zip, "ppt/presentation.xml", &presentation(slides.len()))?;
    write_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(slides.len()),
    )?;
    write_part(
        &mut zip,
        "ppt/slideMasters/slideMaster1.xml",
        &with_header(SLIDE_MASTER),
    )?;
    write_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &with_header(SLIDE_MASTER_RELS),
    )?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/slideLayout1.xml",
        &with_header(SLIDE_LAYOUT),
    )?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &with_header(SLIDE_LAYOUT_RELS),
    )?;
    write_part(&mut zip, "ppt/theme/theme1.xml", &with_header(THEME))?;

    for (index, slide) in slides.iter().enumerate() {
        let number = index + 1;
        write_part(
            &mut zip,
            &format!("ppt/slides/slide{number}.xml"),
            &slide_xml(slide),
        )?;
        write_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            &with_header(SLIDE_RELS),
        )?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| ExportError::Build("PPTX", e.to_string()))?;
    Ok(cursor.into_inner())
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &str,
) -> Result<(), ExportError> {
    zip.start_file(name, SimpleFileOptions::default())
        .map_err(|e| ExportError::Build("PPTX", e.to_string()))?;
    zip.write_all(content.as_bytes())
        .map_err(|e| ExportError::Build("PPTX", e.to_string()))?;
    Ok(())
}

fn with_header(body: &str) -> String {
    format!("{XML_HEADER}{body}")
}

fn content_types(slide_count: usize) -> String {
    let mut overrides = String::new();
    for number in 1..=slide_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    format!(
        r#"{XML_HEADER}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{overrides}</Types>"#
    )
}

fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for index in 0..slide_count {
        // rId1 is the master; slides start at rId2.
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + index,
            index + 2
        ));
    }
    format!(
        r#"{XML_HEADER}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
    );
    for index in 0..slide_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            index + 2,
            index + 1
        ));
    }
    format!(
        r#"{XML_HEADER}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
    )
}

fn slide_xml(slide: &Slide) -> String {
    let title = escape(slide.title.as_str());
    let title_size = slide.title_size;

    let mut paragraphs = String::new();
    for line in &slide.body {
        let text = escape(line.as_str());
        let props = if slide.bullets {
            r#"<a:pPr><a:buChar char="-"/></a:pPr>"#
        } else {
            ""
        };
        paragraphs.push_str(&format!(
            r#"<a:p>{props}<a:r><a:rPr lang="en-US" sz="2000"><a:solidFill><a:srgbClr val="{BODY_COLOR}"/></a:solidFill></a:rPr><a:t>{text}</a:t></a:r></a:p>"#
        ));
    }
    if paragraphs.is_empty() {
        paragraphs.push_str("<a:p/>");
    }

    format!(
        r#"{XML_HEADER}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="685800" y="457200"/><a:ext cx="10820400" cy="1143000"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="{title_size}" b="1"><a:solidFill><a:srgbClr val="{TITLE_COLOR}"/></a:solidFill></a:rPr><a:t>{title}</a:t></a:r></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Body"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="685800" y="1828800"/><a:ext cx="10820400" cy="4572000"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentation_rels_offset_slides_past_the_master() {
        let rels = presentation_rels(2);
        assert!(rels.contains(r#"Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"#));
        assert!(rels.contains(r#"Target="slides/slide2.xml"#));
    }

    #[test]
    fn slide_body_sentences_become_bullet_paragraphs() {
        let slide = Slide {
            title: "Page 1".to_string(),
            title_size: 3000,
            bullets: true,
            body: vec!["First.".to_string(), "Second!".to_string()],
        };
        let xml = slide_xml(&slide);
        assert_eq!(xml.matches("<a:buChar char=\"-\"/>").count(), 2);
        assert!(xml.contains("<a:t>First.</a:t>"));
        assert!(xml.contains("<a:t>Second!</a:t>"));
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let slide = Slide {
            title: "A < B & C".to_string(),
            title_size: 3600,
            bullets: false,
            body: vec![],
        };
        let xml = slide_xml(&slide);
        assert!(xml.contains("A &lt; B &amp; C"));
    }
}
