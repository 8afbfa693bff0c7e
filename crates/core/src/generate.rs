//! Seams to the external services and the deck serializer.
//!
//! Each call is a blocking suspension point of the deck build. Keeping them
//! behind traits lets the builder run against fakes in tests.

use crate::error::{DecoyParseError, Result};
use crate::types::{ConfusablePair, Deck, SlideImage, TargetWord};

/// Outcome of reading a text-generation reply.
///
/// The outer `Result` of [`DecoyGenerator::generate_decoys`] reports service
/// failures; this inner one reports whether the reply had the expected shape.
pub type DecoyReply = std::result::Result<ConfusablePair, DecoyParseError>;

/// Produces two confusable decoy words for a target word.
pub trait DecoyGenerator {
    fn generate_decoys(&self, word: &TargetWord) -> Result<DecoyReply>;
}

/// Produces one picture of a target word.
pub trait ImageSynthesizer {
    fn synthesize(&self, word: &TargetWord) -> Result<SlideImage>;
}

/// Serializes a finished deck to document bytes.
pub trait DeckWriter {
    fn write_deck(&self, deck: &Deck) -> Result<Vec<u8>>;
}
