//! PPTX file writer implementation.

use crate::templates::*;
use esl_core::types::EMU_PER_INCH;
use esl_core::{ChoiceShape, Deck, DeckWriter, Error, ImageFormat, Placement, Result, Slide};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Largest label size in points; OOXML caps `sz` at 400000 hundredths.
const MAX_FONT_SIZE_PT: u32 = 4000;

/// Label text color, white on every fill.
const LABEL_COLOR: &str = "FFFFFF";

/// Writer for PPTX (Office Open XML) exercise decks.
#[derive(Debug, Clone)]
pub struct PptxWriter {
    /// Label font size in points.
    font_size_pt: u32,
}

impl PptxWriter {
    /// Create a new PPTX writer with 24 pt labels.
    pub fn new() -> Self {
        Self { font_size_pt: 24 }
    }

    /// Use a different label font size.
    pub fn with_font_size(mut self, points: u32) -> Self {
        self.font_size_pt = points.clamp(1, MAX_FONT_SIZE_PT);
        self
    }

    /// Serialize the deck into an in-memory PPTX file.
    pub fn to_bytes(&self, deck: &Deck) -> Result<Vec<u8>> {
        let cursor = self.write(deck, Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Serialize the deck as a PPTX package into `out`.
    pub fn write<W: Write + Seek>(&self, deck: &Deck, out: W) -> Result<W> {
        let mut zip = ZipWriter::new(out);
        let xml_options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let media_options = FileOptions::default().compression_method(CompressionMethod::Stored);

        put_part(&mut zip, "[Content_Types].xml", &content_types(deck)?, xml_options)?;
        put_part(&mut zip, "_rels/.rels", &package_rels()?, xml_options)?;
        put_part(&mut zip, "docProps/core.xml", CORE_PROPERTIES.as_bytes(), xml_options)?;
        put_part(&mut zip, "docProps/app.xml", &app_properties(deck)?, xml_options)?;
        put_part(&mut zip, "ppt/presentation.xml", &presentation(deck)?, xml_options)?;
        put_part(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels(deck)?, xml_options)?;
        put_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER.as_bytes(), xml_options)?;
        put_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            SLIDE_MASTER_RELS.as_bytes(),
            xml_options,
        )?;
        put_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT.as_bytes(), xml_options)?;
        put_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            SLIDE_LAYOUT_RELS.as_bytes(),
            xml_options,
        )?;
        put_part(&mut zip, "ppt/theme/theme1.xml", THEME.as_bytes(), xml_options)?;

        for (idx, slide) in deck.slides().iter().enumerate() {
            let n = idx + 1;
            let media = media_name(n, slide.image.format);
            log::debug!("Writing slide {} with {}", n, media);

            put_part(
                &mut zip,
                &format!("ppt/slides/slide{}.xml", n),
                &self.slide_xml(slide)?,
                xml_options,
            )?;
            put_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{}.xml.rels", n),
                &slide_rels(&media)?,
                xml_options,
            )?;
            put_part(&mut zip, &format!("ppt/media/{}", media), &slide.image.bytes, media_options)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish archive: {}", e)))
    }

    /// Build the XML for one slide: picture first, then the answer boxes.
    fn slide_xml(&self, slide: &Slide) -> Result<Vec<u8>> {
        let mut xml = XmlOut::new()?;

        xml.start("p:sld", &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P)])?;
        xml.start("p:cSld", &[])?;
        xml.start("p:spTree", &[])?;

        xml.start("p:nvGrpSpPr", &[])?;
        xml.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
        xml.empty("p:cNvGrpSpPr", &[])?;
        xml.empty("p:nvPr", &[])?;
        xml.end("p:nvGrpSpPr")?;
        xml.start("p:grpSpPr", &[])?;
        xml.transform(&Placement::default(), true)?;
        xml.end("p:grpSpPr")?;

        self.write_picture(&mut xml, slide)?;
        for (idx, choice) in slide.choices.iter().enumerate() {
            // Shape ids 1 and 2 belong to the group and the picture.
            self.write_choice(&mut xml, choice, idx + 3)?;
        }

        xml.end("p:spTree")?;
        xml.end("p:cSld")?;
        xml.start("p:clrMapOvr", &[])?;
        xml.empty("a:masterClrMapping", &[])?;
        xml.end("p:clrMapOvr")?;
        xml.end("p:sld")?;

        Ok(xml.finish())
    }

    fn write_picture(&self, xml: &mut XmlOut, slide: &Slide) -> Result<()> {
        xml.start("p:pic", &[])?;

        xml.start("p:nvPicPr", &[])?;
        xml.empty(
            "p:cNvPr",
            &[("id", "2"), ("name", "Picture 1"), ("descr", slide.target.as_str())],
        )?;
        xml.start("p:cNvPicPr", &[])?;
        xml.empty("a:picLocks", &[("noChangeAspect", "1")])?;
        xml.end("p:cNvPicPr")?;
        xml.empty("p:nvPr", &[])?;
        xml.end("p:nvPicPr")?;

        xml.start("p:blipFill", &[])?;
        xml.empty("a:blip", &[("r:embed", "rId2")])?;
        xml.start("a:stretch", &[])?;
        xml.empty("a:fillRect", &[])?;
        xml.end("a:stretch")?;
        xml.end("p:blipFill")?;

        xml.start("p:spPr", &[])?;
        xml.transform(&slide.picture, false)?;
        xml.geometry("rect")?;
        xml.end("p:spPr")?;

        xml.end("p:pic")
    }

    fn write_choice(&self, xml: &mut XmlOut, choice: &ChoiceShape, shape_id: usize) -> Result<()> {
        let id = shape_id.to_string();
        let name = format!("Rounded Rectangle {}", shape_id - 1);
        let color = choice.color.hex();
        let size = (self.font_size_pt * 100).to_string();

        xml.start("p:sp", &[])?;

        xml.start("p:nvSpPr", &[])?;
        xml.empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        xml.empty("p:cNvSpPr", &[])?;
        xml.empty("p:nvPr", &[])?;
        xml.end("p:nvSpPr")?;

        xml.start("p:spPr", &[])?;
        xml.transform(&choice.placement, false)?;
        xml.geometry("roundRect")?;
        xml.solid_fill(&color)?;
        xml.start("a:ln", &[])?;
        xml.solid_fill(&color)?;
        xml.end("a:ln")?;
        xml.end("p:spPr")?;

        xml.start("p:txBody", &[])?;
        xml.empty("a:bodyPr", &[("rtlCol", "0"), ("anchor", "ctr")])?;
        xml.empty("a:lstStyle", &[])?;
        xml.start("a:p", &[])?;
        xml.empty("a:pPr", &[("algn", "ctr")])?;
        xml.start("a:r", &[])?;
        xml.start("a:rPr", &[("lang", "en-US"), ("sz", size.as_str()), ("b", "1"), ("dirty", "0")])?;
        xml.solid_fill(LABEL_COLOR)?;
        xml.end("a:rPr")?;
        xml.start("a:t", &[])?;
        xml.text(&choice.label())?;
        xml.end("a:t")?;
        xml.end("a:r")?;
        xml.end("a:p")?;
        xml.end("p:txBody")?;

        xml.end("p:sp")
    }
}

impl Default for PptxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckWriter for PptxWriter {
    fn write_deck(&self, deck: &Deck) -> Result<Vec<u8>> {
        self.to_bytes(deck)
            .map_err(|e| Error::SerializationError(format!("Failed to write deck: {}", e)))
    }
}

/// Add one part to the package.
fn put_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    data: &[u8],
    options: FileOptions,
) -> Result<()> {
    zip.start_file(path, options)
        .map_err(|e| Error::ZipError(format!("Failed to start '{}': {}", path, e)))?;
    zip.write_all(data)
        .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", path, e)))
}

/// Media part name for slide `n`.
fn media_name(n: usize, format: ImageFormat) -> String {
    format!("image{}.{}", n, format.extension())
}

fn content_types(deck: &Deck) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;

    let mut formats: Vec<ImageFormat> = Vec::new();
    for slide in deck.slides() {
        if !formats.contains(&slide.image.format) {
            formats.push(slide.image.format);
        }
    }
    for format in formats {
        xml.empty(
            "Default",
            &[("Extension", format.extension()), ("ContentType", format.content_type())],
        )?;
    }

    let overrides = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/docProps/core.xml", CT_CORE_PROPERTIES),
        ("/docProps/app.xml", CT_EXTENDED_PROPERTIES),
    ];
    for (part, content_type) in overrides {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    for n in 1..=deck.len() {
        let part = format!("/ppt/slides/slide{}.xml", n);
        xml.empty("Override", &[("PartName", part.as_str()), ("ContentType", CT_SLIDE)])?;
    }

    xml.end("Types")?;
    Ok(xml.finish())
}

fn package_rels() -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml")?;
    xml.relationship("rId2", REL_CORE_PROPERTIES, "docProps/core.xml")?;
    xml.relationship("rId3", REL_EXTENDED_PROPERTIES, "docProps/app.xml")?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn app_properties(deck: &Deck) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start(
        "Properties",
        &[(
            "xmlns",
            "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
        )],
    )?;
    xml.start("Application", &[])?;
    xml.text("esl-deck")?;
    xml.end("Application")?;
    xml.start("Slides", &[])?;
    xml.text(&deck.len().to_string())?;
    xml.end("Slides")?;
    xml.end("Properties")?;
    Ok(xml.finish())
}

/// `ppt/presentation.xml`. Relationship ids: rId1 master, rId2.. slides, then theme.
fn presentation(deck: &Deck) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start(
        "p:presentation",
        &[("xmlns:a", NS_A), ("xmlns:r", NS_R), ("xmlns:p", NS_P), ("saveSubsetFonts", "1")],
    )?;

    xml.start("p:sldMasterIdLst", &[])?;
    xml.empty("p:sldMasterId", &[("id", "2147483648"), ("r:id", "rId1")])?;
    xml.end("p:sldMasterIdLst")?;

    if !deck.is_empty() {
        xml.start("p:sldIdLst", &[])?;
        for idx in 0..deck.len() {
            let id = (256 + idx).to_string();
            let rel = format!("rId{}", idx + 2);
            xml.empty("p:sldId", &[("id", id.as_str()), ("r:id", rel.as_str())])?;
        }
        xml.end("p:sldIdLst")?;
    }

    let cx = deck.slide_width.to_string();
    let cy = deck.slide_height.to_string();
    xml.empty("p:sldSz", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
    // Notes pages stay portrait letter size.
    let notes_cx = (EMU_PER_INCH * 15 / 2).to_string();
    let notes_cy = (EMU_PER_INCH * 10).to_string();
    xml.empty("p:notesSz", &[("cx", notes_cx.as_str()), ("cy", notes_cy.as_str())])?;

    xml.end("p:presentation")?;
    Ok(xml.finish())
}

fn presentation_rels(deck: &Deck) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml")?;
    for n in 1..=deck.len() {
        xml.relationship(
            &format!("rId{}", n + 1),
            REL_SLIDE,
            &format!("slides/slide{}.xml", n),
        )?;
    }
    xml.relationship(&format!("rId{}", deck.len() + 2), REL_THEME, "theme/theme1.xml")?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn slide_rels(media: &str) -> Result<Vec<u8>> {
    let mut xml = XmlOut::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    xml.relationship("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")?;
    xml.relationship("rId2", REL_IMAGE, &format!("../media/{}", media))?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

/// Thin event writer mapping quick-xml failures into our error type.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self> {
        let mut out = Self {
            writer: Writer::new(Vec::new()),
        };
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(out)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::XmlError(format!("Failed to write XML: {}", e)))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(elem))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(elem))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn relationship(&mut self, id: &str, rel_type: &str, target: &str) -> Result<()> {
        self.empty("Relationship", &[("Id", id), ("Type", rel_type), ("Target", target)])
    }

    /// `a:xfrm`; group transforms also carry the child offset and extent.
    fn transform(&mut self, placement: &Placement, group: bool) -> Result<()> {
        let x = placement.x.to_string();
        let y = placement.y.to_string();
        let cx = placement.cx.to_string();
        let cy = placement.cy.to_string();

        self.start("a:xfrm", &[])?;
        self.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
        self.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        if group {
            self.empty("a:chOff", &[("x", x.as_str()), ("y", y.as_str())])?;
            self.empty("a:chExt", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        }
        self.end("a:xfrm")
    }

    fn geometry(&mut self, preset: &str) -> Result<()> {
        self.start("a:prstGeom", &[("prst", preset)])?;
        self.empty("a:avLst", &[])?;
        self.end("a:prstGeom")
    }

    fn solid_fill(&mut self, hex: &str) -> Result<()> {
        self.start("a:solidFill", &[])?;
        self.empty("a:srgbClr", &[("val", hex)])?;
        self.end("a:solidFill")
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esl_core::{ChoiceSet, SlideAssembler, SlideImage, TargetWord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Read;
    use zip::ZipArchive;

    fn deck_with(words: &[&str]) -> Deck {
        let assembler = SlideAssembler::new();
        let layout = assembler.layout().clone();
        let mut deck = Deck::new(layout.slide_width, layout.slide_height);
        let mut rng = StdRng::seed_from_u64(1);

        for (idx, word) in words.iter().enumerate() {
            let target = TargetWord::new(word).unwrap();
            let choices = ChoiceSet::shuffled(&target, &["x&y".to_string(), "z".to_string()], &mut rng);
            let image = SlideImage::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xD9], ImageFormat::Png);
            deck.add_slide(assembler.assemble(idx + 1, &target, image, &choices, &mut rng));
        }
        deck
    }

    fn read_part(bytes: &[u8], path: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(path).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = PptxWriter::new().to_bytes(&deck_with(&["cat", "dog"])).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
            "ppt/media/image1.jpeg",
            "ppt/media/image2.jpeg",
        ] {
            assert!(names.contains(&part), "missing {part}");
        }
    }

    #[test]
    fn test_content_types_register_media_and_slides() {
        let bytes = PptxWriter::new().to_bytes(&deck_with(&["cat"])).unwrap();
        let types = read_part(&bytes, "[Content_Types].xml");

        assert!(types.contains(r#"Extension="jpeg" ContentType="image/jpeg""#));
        assert!(types.contains(r#"PartName="/ppt/slides/slide1.xml""#));
        assert!(!types.contains("slide2.xml"));
    }

    #[test]
    fn test_slide_xml_has_styled_labels() {
        let bytes = PptxWriter::new().to_bytes(&deck_with(&["cat"])).unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");

        assert!(slide.contains(r#"prst="roundRect""#));
        assert!(slide.contains(r#"sz="2400" b="1""#));
        assert!(slide.contains(r#"<a:srgbClr val="FFFFFF"/>"#));
        assert!(slide.contains(r#"r:embed="rId2""#));
        // Label text is escaped.
        assert!(slide.contains("x&amp;y"));
        assert_eq!(slide.matches("<p:sp>").count(), 3);
        assert_eq!(slide.matches("<p:pic>").count(), 1);
    }

    #[test]
    fn test_font_size_is_clamped() {
        let deck = deck_with(&["cat"]);

        let huge = PptxWriter::new().with_font_size(u32::MAX).to_bytes(&deck).unwrap();
        assert!(read_part(&huge, "ppt/slides/slide1.xml").contains(r#"sz="400000""#));

        let zero = PptxWriter::new().with_font_size(0).to_bytes(&deck).unwrap();
        assert!(read_part(&zero, "ppt/slides/slide1.xml").contains(r#"sz="100""#));
    }

    #[test]
    fn test_presentation_lists_slides_in_order() {
        let bytes = PptxWriter::new().to_bytes(&deck_with(&["a", "b", "c"])).unwrap();
        let presentation = read_part(&bytes, "ppt/presentation.xml");
        let rels = read_part(&bytes, "ppt/_rels/presentation.xml.rels");

        assert!(presentation.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(presentation.contains(r#"<p:sldId id="258" r:id="rId4"/>"#));
        assert!(presentation.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide3.xml""#));
        assert!(rels.contains(r#"Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));
    }

    #[test]
    fn test_media_is_stored_verbatim() {
        let deck = deck_with(&["cat"]);
        let bytes = PptxWriter::new().to_bytes(&deck).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut media = archive.by_name("ppt/media/image1.jpeg").unwrap();
        let mut content = Vec::new();
        media.read_to_end(&mut content).unwrap();
        assert_eq!(content, deck.slides()[0].image.bytes);
    }
}
