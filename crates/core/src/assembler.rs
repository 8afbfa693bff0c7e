//! Slide assembly: one picture plus lettered, colored answer boxes.

use crate::layout::SlideLayout;
use crate::palette::Palette;
use crate::types::{ChoiceSet, ChoiceShape, Slide, SlideImage, TargetWord};
use rand::Rng;

/// Lays out exercise slides.
///
/// Pure apart from the color shuffle, which draws from the caller's RNG.
#[derive(Debug, Clone, Default)]
pub struct SlideAssembler {
    layout: SlideLayout,
    palette: Palette,
}

impl SlideAssembler {
    /// Create an assembler with the default layout and palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// The layout slides are assembled with.
    pub fn layout(&self) -> &SlideLayout {
        &self.layout
    }

    /// Assemble slide `number` from an image and an already shuffled choice set.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        number: usize,
        target: &TargetWord,
        image: SlideImage,
        choices: &ChoiceSet,
        rng: &mut R,
    ) -> Slide {
        let picture = self.layout.picture_placement(image.dimensions);
        let placements = self.layout.choice_placements(choices.len());
        let colors = self.palette.deal(choices.len(), rng);

        let shapes = choices
            .choices()
            .iter()
            .zip(placements)
            .zip(colors)
            .enumerate()
            .map(|(idx, ((text, placement), color))| ChoiceShape {
                letter: letter_for(idx),
                text: text.clone(),
                color,
                placement,
            })
            .collect();

        Slide {
            number,
            target: target.clone(),
            image,
            picture,
            choices: shapes,
        }
    }
}

/// 'A' for index 0, 'B' for 1, and so on.
fn letter_for(idx: usize) -> char {
    char::from_u32('A' as u32 + idx as u32).unwrap_or('?')
}
