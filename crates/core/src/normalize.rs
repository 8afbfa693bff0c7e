//! Target word normalization and validation.
//!
//! Words arrive from free-text input fields and model replies, so they are
//! NFC-normalized and whitespace-collapsed before anything else sees them.

use crate::error::{Error, Result};
use crate::types::TargetWord;
use unicode_normalization::UnicodeNormalization;

/// Smallest number of slides a deck may have.
pub const MIN_SLIDES: usize = 1;

/// Largest number of slides a deck may have.
pub const MAX_SLIDES: usize = 10;

/// Normalize a word for display: NFC, trimmed, inner whitespace collapsed.
pub fn normalize_word(raw: &str) -> String {
    raw.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validate a full set of words before any generation work starts.
///
/// Every entry must be non-empty after normalization and the count must be
/// within [`MIN_SLIDES`]..=[`MAX_SLIDES`].
pub fn validate_words<S: AsRef<str>>(words: &[S]) -> Result<Vec<TargetWord>> {
    validate_slide_count(words.len())?;

    let mut targets = Vec::with_capacity(words.len());
    let mut missing = Vec::new();

    for (idx, raw) in words.iter().enumerate() {
        match TargetWord::new(raw.as_ref()) {
            Some(word) => targets.push(word),
            None => missing.push(format!("Word {}", idx + 1)),
        }
    }

    if !missing.is_empty() {
        return Err(Error::ValidationError(format!(
            "Please enter all words before generating the exercise (missing: {})",
            missing.join(", ")
        )));
    }

    Ok(targets)
}

/// Validate a requested slide count on its own, before prompting for words.
pub fn validate_slide_count(count: usize) -> Result<usize> {
    if (MIN_SLIDES..=MAX_SLIDES).contains(&count) {
        Ok(count)
    } else {
        Err(Error::ValidationError(format!(
            "Number of slides must be between {} and {}, got {}",
            MIN_SLIDES, MAX_SLIDES, count
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_collapses() {
        assert_eq!(normalize_word("  ice   cream \t"), "ice cream");
        assert_eq!(normalize_word("apple"), "apple");
        assert_eq!(normalize_word("   "), "");
    }

    #[test]
    fn test_normalize_composes_accents() {
        // "e" followed by a combining acute accent becomes a single "é".
        assert_eq!(normalize_word("cafe\u{301}"), "caf\u{e9}");
    }

    #[test]
    fn test_validate_accepts_all_present() {
        let words = validate_words(&["electricity", " banana "]).unwrap();
        let words: Vec<&str> = words.iter().map(|w| w.as_str()).collect();
        assert_eq!(words, vec!["electricity", "banana"]);
    }

    #[test]
    fn test_validate_rejects_one_empty_word() {
        let err = validate_words(&["apple", "", "chair"]).unwrap_err();
        match err {
            Error::ValidationError(msg) => {
                assert!(msg.contains("Please enter all words"));
                assert!(msg.contains("Word 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_whitespace_only() {
        assert!(validate_words(&["  "]).is_err());
    }

    #[test]
    fn test_validate_count_bounds() {
        let none: [&str; 0] = [];
        assert!(validate_words(&none).is_err());

        let eleven = vec!["word"; 11];
        assert!(validate_words(&eleven).is_err());

        let ten = vec!["word"; 10];
        assert_eq!(validate_words(&ten).unwrap().len(), 10);
    }

    #[test]
    fn test_validate_slide_count() {
        assert!(validate_slide_count(0).is_err());
        assert_eq!(validate_slide_count(2).unwrap(), 2);
        assert_eq!(validate_slide_count(10).unwrap(), 10);
        assert!(validate_slide_count(11).is_err());
    }
}
