//! PresentationML package writer.
//!
//! Every part is generated as a string and stored in an in-memory ZIP; the
//! destination file is only touched once the whole package is built.

use crate::deck::{Align, Deck, ImageKind, Paragraph, Picture, Rect, RenderedSlide, Shape, TextBox};
use crate::error::Result;
use crate::templates::{
    content_type, rel_type, APP_PROPS_XML, NS_A, NS_P, NS_R, PRES_PROPS_XML, SLIDE_LAYOUT_XML,
    SLIDE_MASTER_XML, SP_TREE_HEADER, TABLE_STYLES_XML, THEME_XML, VIEW_PROPS_XML,
    XML_DECLARATION,
};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// First relationship id used for slides in `presentation.xml.rels`; the
/// ones before it are master, theme and the three property parts.
const FIRST_SLIDE_REL: usize = 6;
const FIRST_SLIDE_ID: usize = 256;
const BULLET_INDENT: i64 = 342_900;

/// Escape text for element content and attribute values. Characters XML
/// 1.0 cannot carry are dropped.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

struct MediaPart {
    name: String,
    bytes: Vec<u8>,
}

struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
}

impl Relationship {
    fn new(id: impl Into<String>, kind: &'static str, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            target: target.into(),
        }
    }
}

fn relationships_xml(rels: &[Relationship]) -> Result<String> {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.kind,
            escape_xml(&rel.target)
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

pub struct PptxWriter;

impl PptxWriter {
    /// Build the complete package in memory.
    pub fn to_bytes(deck: &Deck) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut put = |name: &str, data: &[u8]| -> Result<()> {
            zip.start_file(name, options)?;
            zip.write_all(data)?;
            Ok(())
        };

        let slide_count = deck.slide_count();
        put("[Content_Types].xml", content_types_xml(slide_count)?.as_bytes())?;
        put("_rels/.rels", package_rels_xml()?.as_bytes())?;
        put("docProps/core.xml", core_props_xml(&deck.title).as_bytes())?;
        put("docProps/app.xml", APP_PROPS_XML.as_bytes())?;
        put("ppt/presentation.xml", presentation_xml(deck)?.as_bytes())?;
        put(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels_xml(slide_count)?.as_bytes(),
        )?;
        put("ppt/presProps.xml", PRES_PROPS_XML.as_bytes())?;
        put("ppt/viewProps.xml", VIEW_PROPS_XML.as_bytes())?;
        put("ppt/tableStyles.xml", TABLE_STYLES_XML.as_bytes())?;
        put("ppt/theme/theme1.xml", THEME_XML.as_bytes())?;
        put("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER_XML.as_bytes())?;
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            relationships_xml(&[
                Relationship::new("rId1", rel_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                Relationship::new("rId2", rel_type::THEME, "../theme/theme1.xml"),
            ])?
            .as_bytes(),
        )?;
        put("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT_XML.as_bytes())?;
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            relationships_xml(&[Relationship::new(
                "rId1",
                rel_type::SLIDE_MASTER,
                "../slideMasters/slideMaster1.xml",
            )])?
            .as_bytes(),
        )?;

        let mut media_index = 0usize;
        for (i, slide) in deck.slides().iter().enumerate() {
            let number = i + 1;
            let (xml, rels, media) = slide_parts(slide, &mut media_index)?;
            put(&format!("ppt/slides/slide{number}.xml"), xml.as_bytes())?;
            put(
                &format!("ppt/slides/_rels/slide{number}.xml.rels"),
                relationships_xml(&rels)?.as_bytes(),
            )?;
            for part in media {
                put(&format!("ppt/media/{}", part.name), &part.bytes)?;
            }
        }

        let cursor = zip.finish()?;
        tracing::debug!("Packaged {slide_count} slides ({media_index} images)");
        Ok(cursor.into_inner())
    }

    pub fn write<P: AsRef<Path>>(path: P, deck: &Deck) -> Result<()> {
        let bytes = Self::to_bytes(deck)?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::info!("Wrote deck to {}", path.as_ref().display());
        Ok(())
    }
}

fn content_types_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    write!(
        xml,
        r#"<Default Extension="rels" ContentType="{}"/><Default Extension="xml" ContentType="{}"/>"#,
        content_type::RELATIONSHIPS,
        content_type::XML
    )?;
    for kind in [ImageKind::Png, ImageKind::Jpeg, ImageKind::Gif] {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            kind.extension(),
            kind.content_type()
        )?;
    }

    let overrides = [
        ("/ppt/presentation.xml", content_type::PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", content_type::SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", content_type::SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", content_type::THEME),
        ("/ppt/presProps.xml", content_type::PRES_PROPS),
        ("/ppt/viewProps.xml", content_type::VIEW_PROPS),
        ("/ppt/tableStyles.xml", content_type::TABLE_STYLES),
        ("/docProps/core.xml", content_type::CORE_PROPS),
        ("/docProps/app.xml", content_type::APP_PROPS),
    ];
    for (part, kind) in overrides {
        write!(xml, r#"<Override PartName="{part}" ContentType="{kind}"/>"#)?;
    }
    for number in 1..=slide_count {
        write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="{}"/>"#,
            content_type::SLIDE
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

fn package_rels_xml() -> Result<String> {
    relationships_xml(&[
        Relationship::new("rId1", rel_type::OFFICE_DOCUMENT, "ppt/presentation.xml"),
        Relationship::new("rId2", rel_type::CORE_PROPS, "docProps/core.xml"),
        Relationship::new("rId3", rel_type::APP_PROPS, "docProps/app.xml"),
    ])
}

fn core_props_xml(title: &str) -> String {
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:creator>slidegen</dc:creator>",
            "</cp:coreProperties>"
        ),
        XML_DECLARATION,
        escape_xml(title)
    )
}

fn presentation_xml(deck: &Deck) -> Result<String> {
    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    )?;
    xml.push_str(
        r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
    );
    if deck.slide_count() > 0 {
        xml.push_str("<p:sldIdLst>");
        for i in 0..deck.slide_count() {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + i,
                FIRST_SLIDE_REL + i
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }
    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/>"#,
        deck.geometry.width, deck.geometry.height, deck.geometry.height, deck.geometry.width
    )?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

fn presentation_rels_xml(slide_count: usize) -> Result<String> {
    let mut rels = vec![
        Relationship::new("rId1", rel_type::SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        Relationship::new("rId2", rel_type::THEME, "theme/theme1.xml"),
        Relationship::new("rId3", rel_type::PRES_PROPS, "presProps.xml"),
        Relationship::new("rId4", rel_type::VIEW_PROPS, "viewProps.xml"),
        Relationship::new("rId5", rel_type::TABLE_STYLES, "tableStyles.xml"),
    ];
    for i in 0..slide_count {
        rels.push(Relationship::new(
            format!("rId{}", FIRST_SLIDE_REL + i),
            rel_type::SLIDE,
            format!("slides/slide{}.xml", i + 1),
        ));
    }
    relationships_xml(&rels)
}

/// Slide XML, its relationships and the media it embeds. `media_index`
/// numbers images across the whole package.
fn slide_parts(
    slide: &RenderedSlide,
    media_index: &mut usize,
) -> Result<(String, Vec<Relationship>, Vec<MediaPart>)> {
    let mut rels = vec![Relationship::new(
        "rId1",
        rel_type::SLIDE_LAYOUT,
        "../slideLayouts/slideLayout1.xml",
    )];
    let mut media = Vec::new();

    let mut xml = String::new();
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{SP_TREE_HEADER}"#
    )?;

    for (i, shape) in slide.shapes.iter().enumerate() {
        // id 1 is the tree itself
        let shape_id = i + 2;
        match shape {
            Shape::Text(text) => write_text_box(&mut xml, shape_id, text)?,
            Shape::Picture(picture) => {
                *media_index += 1;
                let name = format!("image{}.{}", *media_index, picture.image.kind.extension());
                let rel_id = format!("rId{}", rels.len() + 1);
                write_picture(&mut xml, shape_id, &rel_id, picture)?;
                rels.push(Relationship::new(
                    rel_id,
                    rel_type::IMAGE,
                    format!("../media/{name}"),
                ));
                media.push(MediaPart {
                    name,
                    bytes: picture.image.bytes.clone(),
                });
            }
        }
    }

    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok((xml, rels, media))
}

fn write_xfrm(xml: &mut String, frame: &Rect) -> Result<()> {
    write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.width, frame.height
    )?;
    Ok(())
}

fn write_text_box(xml: &mut String, id: usize, text: &TextBox) -> Result<()> {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr>"#
    )?;
    write_xfrm(xml, &text.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);

    let wrap = if text.word_wrap { "square" } else { "none" };
    write!(
        xml,
        r#"<p:txBody><a:bodyPr wrap="{wrap}" rtlCol="0"/><a:lstStyle/>"#
    )?;
    for paragraph in &text.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    xml.push_str("</p:txBody></p:sp>");
    Ok(())
}

fn run_properties(paragraph: &Paragraph, element: &str) -> String {
    let style = &paragraph.style;
    let mut xml = format!(
        r#"<a:{element} lang="en-US" sz="{}""#,
        (style.size_pt * 100.0).round() as i64
    );
    if style.bold {
        xml.push_str(r#" b="1""#);
    }
    xml.push_str(r#" dirty="0">"#);
    if let Some(color) = style.color {
        xml.push_str(&format!(
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            color.hex()
        ));
    }
    xml.push_str(&format!(
        r#"<a:latin typeface="{}"/>"#,
        escape_xml(style.font.typeface())
    ));
    xml.push_str(&format!("</a:{element}>"));
    xml
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    xml.push_str("<a:p><a:pPr");
    if paragraph.bullet {
        write!(xml, r#" marL="{BULLET_INDENT}" indent="-{BULLET_INDENT}""#)?;
    }
    if paragraph.align == Align::Center {
        xml.push_str(r#" algn="ctr""#);
    }
    xml.push('>');
    if let Some(pt) = paragraph.space_before_pt {
        write!(
            xml,
            r#"<a:spcBef><a:spcPts val="{}"/></a:spcBef>"#,
            (pt * 100.0).round() as i64
        )?;
    }
    if paragraph.bullet {
        xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="•"/>"#);
    }
    xml.push_str("</a:pPr>");

    let rpr = run_properties(paragraph, "rPr");
    let lines = paragraph
        .text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));
    for (i, line) in lines.enumerate() {
        if i > 0 {
            write!(xml, "<a:br>{rpr}</a:br>")?;
        }
        if !line.is_empty() {
            write!(xml, "<a:r>{rpr}<a:t>{}</a:t></a:r>", escape_xml(line))?;
        }
    }
    xml.push_str(&run_properties(paragraph, "endParaRPr"));
    xml.push_str("</a:p>");
    Ok(())
}

fn write_picture(xml: &mut String, id: usize, rel_id: &str, picture: &Picture) -> Result<()> {
    write!(
        xml,
        concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}" descr="{descr}"/>"#,
            r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#
        ),
        id = id,
        descr = escape_xml(&picture.description),
        rel = rel_id
    )?;
    write_xfrm(xml, &picture.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}
