//! HTTP clients for the services behind each slide: a chat-completions model
//! that drafts decoy words, and an image model that draws the target word.

pub mod config;
pub mod decoys;
mod http;
pub mod images;
pub mod reply;

pub use config::{ImageServiceConfig, TextServiceConfig, IMAGE_API_KEY_ENV, TEXT_API_KEY_ENV};
pub use decoys::ChatDecoyGenerator;
pub use images::StabilityImageSynthesizer;
pub use reply::parse_decoy_reply;
