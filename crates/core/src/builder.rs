//! Deck building: words in, serialized exercise deck out.

use crate::assembler::SlideAssembler;
use crate::error::{Error, Result};
use crate::generate::{DeckWriter, DecoyGenerator, ImageSynthesizer};
use crate::normalize::{normalize_word, validate_words};
use crate::types::{Artifact, ChoiceSet, Deck, Slide, TargetWord};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What to do when the image service fails for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop and report; no partial deck is produced.
    #[default]
    Abort,
    /// Drop the failing word's slide and carry on with the next word.
    SkipSlide,
}

/// Progress events emitted while the deck is being built.
#[derive(Debug)]
pub enum Progress<'a> {
    /// A slide was assembled and appended to the deck.
    SlideCreated {
        number: usize,
        total: usize,
        word: &'a TargetWord,
    },
    /// A word was dropped under [`FailurePolicy::SkipSlide`].
    SlideSkipped {
        position: usize,
        total: usize,
        word: &'a TargetWord,
        error: &'a Error,
    },
}

/// A slide built from fewer decoys than requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedSlide {
    pub word: String,
    pub reason: String,
}

/// A word whose slide was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWord {
    pub word: String,
    pub reason: String,
}

/// Non-fatal problems encountered during a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub degraded: Vec<DegradedSlide>,
    pub skipped: Vec<SkippedWord>,
}

/// A finished deck together with its build report.
#[derive(Debug)]
pub struct DeckOutcome {
    pub deck: Deck,
    pub report: BuildReport,
}

/// Drives the per-word pipeline: decoys, shuffle, image, layout.
pub struct DeckBuilder<'a> {
    decoys: &'a dyn DecoyGenerator,
    images: &'a dyn ImageSynthesizer,
    assembler: SlideAssembler,
    policy: FailurePolicy,
}

impl<'a> DeckBuilder<'a> {
    /// Create a builder over the two generators with default layout and policy.
    pub fn new(decoys: &'a dyn DecoyGenerator, images: &'a dyn ImageSynthesizer) -> Self {
        Self {
            decoys,
            images,
            assembler: SlideAssembler::default(),
            policy: FailurePolicy::default(),
        }
    }

    /// Use a custom slide assembler.
    pub fn with_assembler(mut self, assembler: SlideAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Set the failure policy for service errors.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a deck with one slide per word, in input order.
    ///
    /// All words are validated before the first service call.
    pub fn build<S, R>(
        &self,
        words: &[S],
        rng: &mut R,
        progress: &mut dyn FnMut(Progress<'_>),
    ) -> Result<DeckOutcome>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let targets = validate_words(words)?;
        let total = targets.len();

        let layout = self.assembler.layout();
        let mut deck = Deck::new(layout.slide_width, layout.slide_height);
        let mut report = BuildReport::default();

        for (idx, word) in targets.iter().enumerate() {
            log::info!("Generating slide {}/{} for '{}'", idx + 1, total, word);

            match self.build_slide(deck.len() + 1, word, rng, &mut report) {
                Ok(slide) => {
                    deck.add_slide(slide);
                    progress(Progress::SlideCreated {
                        number: deck.len(),
                        total,
                        word,
                    });
                }
                Err(err) if self.policy == FailurePolicy::SkipSlide && err.is_service_error() => {
                    log::warn!("Skipping slide for '{}': {}", word, err);
                    progress(Progress::SlideSkipped {
                        position: idx + 1,
                        total,
                        word,
                        error: &err,
                    });
                    report.skipped.push(SkippedWord {
                        word: word.to_string(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    log::error!("Aborting deck at '{}': {}", word, err);
                    return Err(err);
                }
            }
        }

        Ok(DeckOutcome { deck, report })
    }

    /// Build the deck and serialize it into the downloadable artifact.
    pub fn build_artifact<S, R>(
        &self,
        words: &[S],
        rng: &mut R,
        progress: &mut dyn FnMut(Progress<'_>),
        writer: &dyn DeckWriter,
    ) -> Result<(Artifact, BuildReport)>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let DeckOutcome { deck, report } = self.build(words, rng, progress)?;

        if deck.is_empty() {
            return Err(Error::SerializationError(
                "no slides were generated, nothing to write".into(),
            ));
        }

        let bytes = writer.write_deck(&deck)?;
        log::info!("Serialized {} slides into {} bytes", deck.len(), bytes.len());

        Ok((Artifact::pptx(bytes), report))
    }

    fn build_slide<R: Rng + ?Sized>(
        &self,
        number: usize,
        word: &TargetWord,
        rng: &mut R,
        report: &mut BuildReport,
    ) -> Result<Slide> {
        let (decoys, degraded) = match self.decoys.generate_decoys(word) {
            Ok(Ok(pair)) => (pair.words().to_vec(), None),
            Ok(Err(parse_err)) => {
                let recovered = parse_err
                    .recovered()
                    .iter()
                    .map(|w| normalize_word(w))
                    .filter(|w| !w.is_empty())
                    .collect();
                (recovered, Some(parse_err.to_string()))
            }
            // A failed text service costs the slide its decoys, not the deck.
            Err(err) if err.is_service_error() => (Vec::new(), Some(err.to_string())),
            Err(err) => return Err(err),
        };

        let choices = ChoiceSet::shuffled(word, &decoys, rng);
        log::debug!("Choices for '{}': {:?}", word, choices.choices());

        let image = self.images.synthesize(word)?;
        log::debug!(
            "Image for '{}': {} bytes, {:?}",
            word,
            image.bytes.len(),
            image.dimensions
        );

        if let Some(reason) = degraded {
            log::warn!("Degrading slide for '{}': {}", word, reason);
            report.degraded.push(DegradedSlide {
                word: word.to_string(),
                reason,
            });
        }

        Ok(self.assembler.assemble(number, word, image, &choices, rng))
    }
}
