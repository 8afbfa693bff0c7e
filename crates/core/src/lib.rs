//! Core domain types, slide layout, and deck assembly for ESL sound-alike
//! exercises.

pub mod assembler;
pub mod builder;
pub mod error;
pub mod generate;
pub mod image;
pub mod layout;
pub mod normalize;
pub mod palette;
pub mod types;

pub use assembler::SlideAssembler;
pub use builder::{BuildReport, DeckBuilder, DeckOutcome, FailurePolicy, Progress};
pub use error::{DecoyParseError, Error, Result};
pub use generate::{DeckWriter, DecoyGenerator, DecoyReply, ImageSynthesizer};
pub use layout::SlideLayout;
pub use normalize::{normalize_word, validate_slide_count, validate_words, MAX_SLIDES, MIN_SLIDES};
pub use palette::Palette;
pub use types::{
    Artifact, ChoiceSet, ChoiceShape, ConfusablePair, Deck, ImageFormat, Placement, Rgb, Slide,
    SlideImage, TargetWord,
};
