//! Reading decoy words out of a free-form model reply.
//!
//! Models asked for bare JSON still wrap it in code fences or a sentence of
//! prose now and then; both are tolerated.

use esl_core::{normalize_word, ConfusablePair, DecoyParseError, DecoyReply};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// Regex matching a reply wrapped in a Markdown code fence, optionally tagged `json`.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(?:json|JSON)?\s*(.*?)\s*```$").unwrap());

/// Regex matching the outermost JSON object inside surrounding prose.
static JSON_OBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

#[derive(Debug, Deserialize)]
struct ConfusionWords {
    confusion_words: Vec<String>,
}

/// Parse a reply of the form `{"confusion_words": ["word_1", "word_2"]}`.
///
/// Words are normalized and blank entries dropped. Extra words beyond the
/// first two are ignored; fewer than two is a [`DecoyParseError::TooFew`].
pub fn parse_decoy_reply(reply: &str) -> DecoyReply {
    let trimmed = reply.trim();
    let unfenced = CODE_FENCE_REGEX
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    let parsed = serde_json::from_str::<ConfusionWords>(unfenced).or_else(|first_err| {
        JSON_OBJECT_REGEX
            .find(unfenced)
            .ok_or(first_err)
            .and_then(|m| serde_json::from_str::<ConfusionWords>(m.as_str()))
    });

    let words: Vec<String> = match parsed {
        Ok(reply) => reply
            .confusion_words
            .iter()
            .map(|w| normalize_word(w))
            .filter(|w| !w.is_empty())
            .collect(),
        Err(e) => return Err(DecoyParseError::Malformed(e.to_string())),
    };

    match words.as_slice() {
        [first, second, ..] => Ok(ConfusablePair::new(first.clone(), second.clone())),
        _ => Err(DecoyParseError::TooFew { recovered: words }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> DecoyReply {
        Ok(ConfusablePair::new(a, b))
    }

    #[test]
    fn test_bare_json() {
        let reply = r#"{"confusion_words": ["elasticity", "electrician"]}"#;
        assert_eq!(parse_decoy_reply(reply), pair("elasticity", "electrician"));
    }

    #[test]
    fn test_code_fence_with_language_tag() {
        let reply = "```json\n{\"confusion_words\": [\"sheep\", \"chip\"]}\n```";
        assert_eq!(parse_decoy_reply(reply), pair("sheep", "chip"));
    }

    #[test]
    fn test_code_fence_without_tag() {
        let reply = "  ```\n{\"confusion_words\": [\"hat\", \"bat\"]}\n```  ";
        assert_eq!(parse_decoy_reply(reply), pair("hat", "bat"));
    }

    #[test]
    fn test_surrounding_prose() {
        let reply = "Sure! Here you go: {\"confusion_words\": [\"pear\", \"bear\"]} Good luck.";
        assert_eq!(parse_decoy_reply(reply), pair("pear", "bear"));
    }

    #[test]
    fn test_extra_words_truncated() {
        let reply = r#"{"confusion_words": ["a", "b", "c"]}"#;
        assert_eq!(parse_decoy_reply(reply), pair("a", "b"));
    }

    #[test]
    fn test_too_few_keeps_recovered() {
        let reply = r#"{"confusion_words": ["sheep", "  "]}"#;
        assert_eq!(
            parse_decoy_reply(reply),
            Err(DecoyParseError::TooFew {
                recovered: vec!["sheep".to_string()]
            })
        );
    }

    #[test]
    fn test_not_json() {
        let err = parse_decoy_reply("I cannot help with that.").unwrap_err();
        assert!(matches!(err, DecoyParseError::Malformed(_)));
        assert!(err.recovered().is_empty());
    }

    #[test]
    fn test_wrong_shape() {
        let err = parse_decoy_reply(r#"{"words": ["a", "b"]}"#).unwrap_err();
        assert!(matches!(err, DecoyParseError::Malformed(_)));
    }

    #[test]
    fn test_words_are_normalized() {
        let reply = r#"{"confusion_words": [" ice  cream ", "nice"]}"#;
        assert_eq!(parse_decoy_reply(reply), pair("ice cream", "nice"));
    }
}
