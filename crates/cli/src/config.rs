//! Config file loading for `esl-deck`.
//!
//! Every field is optional; a missing file means all defaults.

use anyhow::{Context, Result};
use esl_core::{FailurePolicy, Palette, Rgb};
use esl_services::{ImageServiceConfig, TextServiceConfig};
use serde::Deserialize;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "esl-deck.toml";

/// Top-level config file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub text: TextServiceConfig,

    #[serde(default)]
    pub image: ImageServiceConfig,

    #[serde(default)]
    pub deck: DeckConfig,
}

/// `[deck]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeckConfig {
    /// What to do when a service call fails for one word.
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Answer box colors as six-digit hex strings.
    #[serde(default)]
    pub palette: Option<Vec<String>>,

    /// Label font size in points.
    #[serde(default)]
    pub font_size_pt: Option<u32>,
}

impl AppConfig {
    /// Load `explicit` if given, else `esl-deck.toml` in the working directory if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    log::debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse config file contents.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl DeckConfig {
    /// The configured palette, or the default one.
    pub fn palette(&self) -> Result<Palette> {
        let Some(hexes) = &self.palette else {
            return Ok(Palette::default());
        };

        let colors = hexes
            .iter()
            .map(|hex| parse_hex(hex))
            .collect::<Result<Vec<_>>>()?;
        Ok(Palette::new(colors)?)
    }
}

fn parse_hex(hex: &str) -> Result<Rgb> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("invalid palette color '{}', expected RRGGBB", hex);
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
    Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
}
