//! PPTX file reader for inspecting generated decks.

use esl_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// What a reloaded slide contains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideSummary {
    /// 1-based slide number.
    pub number: usize,

    /// Embedded pictures on the slide.
    pub pictures: usize,

    /// Texts of the labeled shapes, top to bottom.
    pub labels: Vec<String>,
}

/// Reader for PPTX (Office Open XML) files.
pub struct PptxReader;

impl PptxReader {
    /// Create a new PPTX reader.
    pub fn new() -> Self {
        Self
    }

    /// Summarize every slide of a PPTX file, in presentation order.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<Vec<SlideSummary>> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("Found {} slides", slide_order.len());

        slide_order
            .iter()
            .enumerate()
            .map(|(idx, path)| self.read_slide(&mut archive, path, idx + 1))
            .collect()
    }

    /// Get the ordered list of slide paths from the presentation relationships.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let rel_type = attr_value(e, b"Type").unwrap_or_default();
                    let target = attr_value(e, b"Target").unwrap_or_default();

                    if rel_type.ends_with("/slide") {
                        let order_num = extract_slide_number(&target);
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        // Sort slides by their number
        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn read_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<SlideSummary> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let (pictures, mut shapes) = self.extract_shapes_from_xml(&content)?;

        shapes.sort_by_key(|s| (s.y, s.x));

        Ok(SlideSummary {
            number,
            pictures,
            labels: shapes.into_iter().map(|s| s.text).collect(),
        })
    }

    /// Count pictures and collect text shapes with their positions.
    fn extract_shapes_from_xml(&self, xml_content: &str) -> Result<(usize, Vec<ShapeInfo>)> {
        let mut pictures = 0;
        let mut shapes = Vec::new();
        let mut reader = Reader::from_str(xml_content);
        reader.trim_text(true);

        let mut current_shape: Option<ShapeInfo> = None;
        let mut in_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => current_shape = Some(ShapeInfo::default()),
                    b"pic" => pictures += 1,
                    b"t" => in_text = true,
                    b"p" => {
                        if let Some(ref mut shape) = current_shape {
                            if !shape.text.is_empty() {
                                shape.text.push('\n');
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if local_name(e.name().as_ref()) == b"off" {
                        if let Some(ref mut shape) = current_shape {
                            shape.x = attr_value(e, b"x").and_then(|v| v.parse().ok()).unwrap_or(0);
                            shape.y = attr_value(e, b"y").and_then(|v| v.parse().ok()).unwrap_or(0);
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_text {
                        if let Some(ref mut shape) = current_shape {
                            let text = e.unescape().unwrap_or_default();
                            shape.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"sp" => {
                        if let Some(mut shape) = current_shape.take() {
                            shape.text = shape.text.trim().to_string();
                            if !shape.text.is_empty() {
                                shapes.push(shape);
                            }
                        }
                    }
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
                }
                _ => {}
            }
        }

        Ok((pictures, shapes))
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for PptxReader {
    fn default() -> Self {
        Self::new()
    }
}

/// A text shape found on a slide.
#[derive(Debug, Default)]
struct ShapeInfo {
    text: String,
    x: i64,
    y: i64,
}

/// Value of the attribute `key` on an element, if present.
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a part name like "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
