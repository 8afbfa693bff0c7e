//! Domain types for exercise slides and decks.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// English Metric Units per inch, the OOXML drawing unit.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// File name of the downloadable exercise deck.
pub const EXERCISE_FILE_NAME: &str = "ESL_Exercise.pptx";

/// MIME type of the downloadable exercise deck.
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Convert inches to EMU.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// A normalized, non-empty word the slide is built to teach.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetWord(String);

impl TargetWord {
    /// Normalize `raw` and wrap it, or return `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let word = crate::normalize::normalize_word(raw);
        if word.is_empty() {
            None
        } else {
            Some(Self(word))
        }
    }

    /// The normalized word.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exactly two words a beginner could mistake for the target.
///
/// Uniqueness is not enforced, neither against the target nor between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusablePair([String; 2]);

impl ConfusablePair {
    /// Create a pair from two words.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self([first.into(), second.into()])
    }

    /// Both decoy words, in reply order.
    pub fn words(&self) -> &[String] {
        &self.0
    }
}

/// The answer options shown on one slide.
///
/// Shuffled exactly once at construction; the resulting order fixes the
/// A, B, C lettering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    choices: Vec<String>,
}

impl ChoiceSet {
    /// Build the set {target} ∪ decoys and shuffle its order.
    pub fn shuffled<R: Rng + ?Sized>(target: &TargetWord, decoys: &[String], rng: &mut R) -> Self {
        let mut choices = Vec::with_capacity(decoys.len() + 1);
        choices.push(target.as_str().to_string());
        choices.extend(decoys.iter().cloned());
        choices.shuffle(rng);
        Self { choices }
    }

    /// Build a set whose order is already decided.
    pub fn in_order(choices: Vec<String>) -> Self {
        Self { choices }
    }

    /// Choices in display order.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Number of choices.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    /// Whether the set holds no choices.
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Raster encoding of a generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// The `output_format` value requested from the image service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// File extension used for the embedded media part.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// Content type registered for the media part.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return Some(Self::Webp);
        }
        None
    }
}

/// A generated image owned by exactly one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideImage {
    /// Encoded image bytes, as returned by the image service.
    pub bytes: Vec<u8>,

    /// Encoding of `bytes`.
    pub format: ImageFormat,

    /// Pixel dimensions, if the header could be read.
    pub dimensions: Option<(u32, u32)>,
}

impl SlideImage {
    /// Wrap image bytes, sniffing the real format and pixel size from the header.
    ///
    /// `declared` is used when the bytes carry no recognizable signature.
    pub fn from_bytes(bytes: Vec<u8>, declared: ImageFormat) -> Self {
        let format = ImageFormat::from_magic(&bytes).unwrap_or(declared);
        let dimensions = crate::image::dimensions(&bytes, format);
        Self {
            bytes,
            format,
            dimensions,
        }
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Six-digit uppercase hex, as DrawingML `srgbClr` expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Position and size of a shape on the slide, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Placement {
    /// Bottom edge of the shape.
    pub fn bottom(&self) -> i64 {
        self.y + self.cy
    }
}

/// One lettered, colored answer box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceShape {
    /// 'A' for the first choice, 'B' for the second, and so on.
    pub letter: char,

    /// The choice word as shown after the letter.
    pub text: String,

    /// Fill and outline color.
    pub color: Rgb,

    /// Where the box sits on the slide.
    pub placement: Placement,
}

impl ChoiceShape {
    /// The rendered label, e.g. `"A. electricity"`.
    pub fn label(&self) -> String {
        format!("{}. {}", self.letter, self.text)
    }
}

/// A fully assembled exercise slide.
#[derive(Debug, Clone)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// The word the picture shows.
    pub target: TargetWord,

    /// The generated picture.
    pub image: SlideImage,

    /// Where the picture sits.
    pub picture: Placement,

    /// Answer boxes in lettering order.
    pub choices: Vec<ChoiceShape>,
}

/// The ordered collection of slides produced in one run.
#[derive(Debug, Clone)]
pub struct Deck {
    /// Slide width in EMU.
    pub slide_width: i64,

    /// Slide height in EMU.
    pub slide_height: i64,

    slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck with the given slide size.
    pub fn new(slide_width: i64, slide_height: i64) -> Self {
        Self {
            slide_width,
            slide_height,
            slides: Vec::new(),
        }
    }

    /// Append a slide. Slides are never reordered or removed.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// A serialized deck ready for download.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Wrap serialized PPTX bytes under the fixed exercise name and MIME type.
    pub fn pptx(bytes: Vec<u8>) -> Self {
        Self {
            file_name: EXERCISE_FILE_NAME.to_string(),
            mime_type: PPTX_MIME_TYPE.to_string(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_target_word_rejects_blank() {
        assert!(TargetWord::new("").is_none());
        assert!(TargetWord::new("   \t").is_none());
        assert_eq!(TargetWord::new("  apple ").unwrap().as_str(), "apple");
    }

    #[test]
    fn test_choice_set_is_permutation_of_target_and_decoys() {
        let target = TargetWord::new("electricity").unwrap();
        let decoys = vec!["elasticity".to_string(), "electrician".to_string()];

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = ChoiceSet::shuffled(&target, &decoys, &mut rng);

            let mut shown = set.choices().to_vec();
            shown.sort();
            assert_eq!(shown, vec!["elasticity", "electrician", "electricity"]);
        }
    }

    #[test]
    fn test_choice_set_keeps_duplicates() {
        let target = TargetWord::new("cat").unwrap();
        let decoys = vec!["cat".to_string(), "hat".to_string()];
        let mut rng = StdRng::seed_from_u64(7);
        let set = ChoiceSet::shuffled(&target, &decoys, &mut rng);

        assert_eq!(set.len(), 3);
        assert_eq!(set.choices().iter().filter(|c| *c == "cat").count(), 2);
    }

    #[test]
    fn test_image_format_from_magic() {
        assert_eq!(
            ImageFormat::from_magic(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::from_magic(b"GIF89a"), None);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb(255, 192, 0).hex(), "FFC000");
        assert_eq!(Rgb(0, 112, 192).hex(), "0070C0");
    }

    #[test]
    fn test_choice_label() {
        let shape = ChoiceShape {
            letter: 'B',
            text: "elasticity".to_string(),
            color: Rgb(0, 0, 0),
            placement: Placement::default(),
        };
        assert_eq!(shape.label(), "B. elasticity");
    }

    #[test]
    fn test_inches() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(0.5), 457_200);
        assert_eq!(inches(1.9), 1_737_360);
    }
}
