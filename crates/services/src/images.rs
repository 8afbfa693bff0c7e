//! Image synthesis over the Stability image-generation API.

use crate::config::ImageServiceConfig;
use crate::http::{build_client, error_message};
use esl_core::{Error, ImageFormat, ImageSynthesizer, Result, SlideImage, TargetWord};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

const SERVICE: &str = "image generation";

/// Build the image prompt for one target word.
pub fn image_prompt(word: &str) -> String {
    format!("realistic easily identifiable example of {}", word)
}

/// Image synthesizer backed by a multipart image-generation endpoint.
///
/// One request per word, no retries, no caching: the same word generates a
/// new picture every run.
#[derive(Clone)]
pub struct StabilityImageSynthesizer {
    api_key: String,
    endpoint: String,
    output_format: ImageFormat,
    client: Client,
}

impl std::fmt::Debug for StabilityImageSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StabilityImageSynthesizer")
            .field("endpoint", &self.endpoint)
            .field("output_format", &self.output_format)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StabilityImageSynthesizer {
    /// Create a synthesizer with an explicit API key.
    pub fn new(api_key: String, config: &ImageServiceConfig) -> Result<Self> {
        Ok(Self {
            api_key,
            endpoint: config.api_url.clone(),
            output_format: config.output_format,
            client: build_client(config.timeout_secs, SERVICE)?,
        })
    }

    /// Create a synthesizer, taking the key from the config or the environment.
    pub fn from_config(config: &ImageServiceConfig) -> Result<Self> {
        Self::new(config.resolve_api_key()?, config)
    }
}

impl ImageSynthesizer for StabilityImageSynthesizer {
    fn synthesize(&self, word: &TargetWord) -> Result<SlideImage> {
        let form = Form::new()
            .text("prompt", image_prompt(word.as_str()))
            .text("output_format", self.output_format.as_str());

        log::debug!("Requesting image for '{}'", word);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "image/*")
            .multipart(form)
            .send()
            .map_err(|e| Error::service(SERVICE, None, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            return Err(Error::service(
                SERVICE,
                Some(status.as_u16()),
                error_message(&body_text, status),
            ));
        }

        let bytes = response.bytes().map_err(|e| {
            Error::service(
                SERVICE,
                Some(status.as_u16()),
                format!("Failed to read image body: {}", e),
            )
        })?;

        if bytes.is_empty() {
            return Err(Error::service(
                SERVICE,
                Some(status.as_u16()),
                "response contained no image data",
            ));
        }

        let image = SlideImage::from_bytes(bytes.to_vec(), self.output_format);
        log::debug!(
            "Received {} bytes of {:?} for '{}'",
            image.bytes.len(),
            image.format,
            word
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const PNG_1X2: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0,
        0, 1, 0, 0, 0, 2, 8, 6, 0, 0, 0,
    ];

    fn config(server: &mockito::Server) -> ImageServiceConfig {
        ImageServiceConfig {
            api_url: format!("{}/v2beta/stable-image/generate/ultra", server.url()),
            api_key: None,
            output_format: ImageFormat::Png,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_synthesize_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v2beta/stable-image/generate/ultra")
            .match_header("authorization", "Bearer sk-img")
            .match_header("accept", "image/*")
            .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("realistic easily identifiable example of apple".into()),
                Matcher::Regex("name=\"output_format\"".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(PNG_1X2)
            .expect(1)
            .create();

        let synth = StabilityImageSynthesizer::new("sk-img".into(), &config(&server)).unwrap();
        let image = synth.synthesize(&TargetWord::new("apple").unwrap()).unwrap();

        assert_eq!(image.bytes, PNG_1X2);
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.dimensions, Some((1, 2)));
        mock.assert();
    }

    #[test]
    fn test_failure_surfaces_status_and_body() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/v2beta/stable-image/generate/ultra")
            .with_status(402)
            .with_body("insufficient credits")
            .create();

        let synth = StabilityImageSynthesizer::new("k".into(), &config(&server)).unwrap();
        let err = synth.synthesize(&TargetWord::new("apple").unwrap()).unwrap_err();

        match err {
            Error::ServiceError { status, message, .. } => {
                assert_eq!(status, Some(402));
                assert_eq!(message, "insufficient credits");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_body_is_an_error() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("POST", "/v2beta/stable-image/generate/ultra")
            .with_status(200)
            .create();

        let synth = StabilityImageSynthesizer::new("k".into(), &config(&server)).unwrap();
        assert!(synth.synthesize(&TargetWord::new("apple").unwrap()).is_err());
    }

    #[test]
    fn test_image_prompt() {
        assert_eq!(image_prompt("apple"), "realistic easily identifiable example of apple");
    }
}
