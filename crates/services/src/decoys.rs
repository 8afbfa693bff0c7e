//! Decoy-word generation over a chat-completions API.

use crate::config::TextServiceConfig;
use crate::http::{build_client, error_message};
use crate::reply::parse_decoy_reply;
use esl_core::{DecoyGenerator, DecoyParseError, DecoyReply, Error, Result, TargetWord};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SERVICE: &str = "text generation";

/// Build the fixed instruction for one target word.
pub fn decoy_prompt(word: &str) -> String {
    format!(
        "You are to create an exercise for level 0 English as a Second Language learners \
         who have absolutely no knowledge of English. \
         Your task is to provide two words that could be verbally or visually confused with '{word}'. \
         The words should be easily explainable in classroom by pointing at an object or miming. \
         The words should be single words, not phrases. \
         Respond exclusively with a JSON Object with no additional text or labels: \
         JSON object {{\"confusion_words\": [\"word_1\", \"word_2\"]}}. \
         An example is user_input: electricity correct response: \
         {{\"confusion_words\": [\"elasticity\", \"electrician\"]}}."
    )
}

/// The `response_format` contract: an object holding exactly two strings.
pub fn response_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "confusion_words_schema",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "confusion_words": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 2,
                        "maxItems": 2
                    }
                },
                "required": ["confusion_words"],
                "additionalProperties": false
            }
        }
    })
}

/// Decoy generator backed by a chat-completions endpoint.
///
/// One request per word, no retries.
#[derive(Clone)]
pub struct ChatDecoyGenerator {
    api_key: String,
    endpoint: String,
    model: String,
    response_schema: bool,
    client: Client,
}

impl std::fmt::Debug for ChatDecoyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDecoyGenerator")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ChatDecoyGenerator {
    /// Create a generator with an explicit API key.
    pub fn new(api_key: String, config: &TextServiceConfig) -> Result<Self> {
        let client = build_client(config.timeout_secs, SERVICE)?;
        let endpoint = format!("{}/chat/completions", config.api_url.trim_end_matches('/'));

        Ok(Self {
            api_key,
            endpoint,
            model: config.model.clone(),
            response_schema: config.response_schema,
            client,
        })
    }

    /// Create a generator, taking the key from the config or the environment.
    pub fn from_config(config: &TextServiceConfig) -> Result<Self> {
        Self::new(config.resolve_api_key()?, config)
    }

    fn send_request(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|e| Error::service(SERVICE, None, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body_text = response.text().map_err(|e| {
            Error::service(
                SERVICE,
                Some(status.as_u16()),
                format!("Failed to read response body: {}", e),
            )
        })?;

        if !status.is_success() {
            return Err(Error::service(
                SERVICE,
                Some(status.as_u16()),
                error_message(&body_text, status),
            ));
        }

        serde_json::from_str(&body_text).map_err(|e| {
            Error::service(
                SERVICE,
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e),
            )
        })
    }
}

impl DecoyGenerator for ChatDecoyGenerator {
    fn generate_decoys(&self, word: &TargetWord) -> Result<DecoyReply> {
        let prompt = decoy_prompt(word.as_str());
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            response_format: self.response_schema.then(response_schema),
        };

        log::debug!("Requesting decoys for '{}' from {}", word, self.model);
        let response = self.send_request(&request)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        log::debug!("Decoy reply for '{}': {}", word, content);

        if content.trim().is_empty() {
            return Ok(Err(DecoyParseError::Malformed("empty reply".into())));
        }

        Ok(parse_decoy_reply(&content))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}
