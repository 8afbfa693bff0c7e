//! Answer box colors.

use crate::error::{Error, Result};
use crate::types::Rgb;
use rand::seq::SliceRandom;
use rand::Rng;

/// The classroom palette: bright fills that read well under white bold text.
const CLASSROOM_COLORS: &[Rgb] = &[
    Rgb(255, 192, 0),  // orange
    Rgb(0, 176, 240),  // blue
    Rgb(146, 208, 80), // green
    Rgb(255, 0, 0),    // red
    Rgb(112, 48, 160), // purple
    Rgb(0, 112, 192),  // dark blue
    Rgb(0, 176, 80),   // dark green
    Rgb(255, 192, 0),  // gold
    Rgb(255, 0, 255),  // magenta
    Rgb(0, 176, 240),  // cyan
];

/// A fixed set of distinct colors dealt to the answer boxes of a slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dedup(CLASSROOM_COLORS.to_vec())
    }
}

impl Palette {
    /// Create a palette from a color list. Repeated colors are dropped.
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        let palette = Self::dedup(colors);
        if palette.colors.is_empty() {
            return Err(Error::ConfigError("palette must contain at least one color".into()));
        }
        Ok(palette)
    }

    fn dedup(colors: Vec<Rgb>) -> Self {
        let mut unique: Vec<Rgb> = Vec::with_capacity(colors.len());
        for color in colors {
            if !unique.contains(&color) {
                unique.push(color);
            }
        }
        Self { colors: unique }
    }

    /// The distinct colors, in definition order.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Deal `count` colors for one slide.
    ///
    /// Colors are drawn without replacement from a freshly shuffled copy of
    /// the palette. When a slide needs more colors than the palette has, the
    /// palette is reshuffled and dealt again, so colors only repeat after
    /// every color has been used once.
    pub fn deal<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Rgb> {
        let mut dealt = Vec::with_capacity(count);
        let mut deck: Vec<Rgb> = Vec::new();

        while dealt.len() < count {
            if deck.is_empty() {
                deck = self.colors.clone();
                deck.shuffle(rng);
            }
            match deck.pop() {
                Some(color) => dealt.push(color),
                None => break,
            }
        }

        dealt
    }
}
