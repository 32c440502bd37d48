//! JSON payloads exchanged between puzzle server and client

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lexispark_core::{BloomFilter, PuzzleRef};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Name shown instead of the real category for the hidden daily puzzle
pub const HIDDEN_DAILY_NAME: &str = "Hidden Daily Challenge";

/// Response to opening a puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStart {
    /// Length of every word, in catalog order
    pub word_lengths: Vec<usize>,
    /// Base64 of the serialized Bloom filter
    pub bloom_filter: String,
    /// Category name, or [`HIDDEN_DAILY_NAME`]
    pub category_name: String,
    /// Category id, withheld for the hidden daily puzzle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u32>,
}

impl PuzzleStart {
    /// Raw blob bytes
    pub fn blob_bytes(&self) -> Result<Vec<u8>> {
        Ok(decode_blob(&self.bloom_filter)?)
    }

    /// Decode the shipped filter
    pub fn filter(&self) -> Result<BloomFilter> {
        Ok(BloomFilter::from_bytes(&self.blob_bytes()?)?)
    }

    /// Reference to confirm guesses against for the rest of the session
    ///
    /// Once the server has named the category, guesses go to that id so a
    /// date rollover or a new random draw cannot swap the catalog. Only the
    /// hidden daily keeps its symbolic reference.
    pub fn session_ref(&self, requested: PuzzleRef) -> PuzzleRef {
        self.category_id.map_or(requested, PuzzleRef::Id)
    }
}

/// Guess submitted for authoritative confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Guess as typed; the server normalizes it
    pub word: String,
}

/// Authoritative answer to a guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_word: Option<String>,
}

impl GuessResponse {
    /// The word is not in the catalog
    pub fn not_found() -> Self {
        Self {
            found: false,
            index: None,
            display_word: None,
        }
    }

    /// The word sits at `index`
    pub fn found(index: usize, display_word: String) -> Self {
        Self {
            found: true,
            index: Some(index),
            display_word: Some(display_word),
        }
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Base64-encode blob bytes for the wire
pub fn encode_blob(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a base64 blob from the wire
pub fn decode_blob(encoded: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_puzzle_start_shape() {
        let start = PuzzleStart {
            word_lengths: vec![3, 3, 4],
            bloom_filter: "AAAA".into(),
            category_name: "Animals".into(),
            category_id: Some(4),
        };
        assert_eq!(
            serde_json::to_value(&start).unwrap(),
            json!({
                "wordLengths": [3, 3, 4],
                "bloomFilter": "AAAA",
                "categoryName": "Animals",
                "categoryId": 4
            })
        );

        let hidden = PuzzleStart {
            category_id: None,
            ..start
        };
        let value = serde_json::to_value(&hidden).unwrap();
        assert!(value.get("categoryId").is_none());
    }

    #[test]
    fn test_session_ref_pins_named_categories() {
        let start = PuzzleStart {
            word_lengths: vec![3],
            bloom_filter: String::new(),
            category_name: "Pets".into(),
            category_id: Some(7),
        };
        assert_eq!(start.session_ref(PuzzleRef::Daily), PuzzleRef::Id(7));
        assert_eq!(start.session_ref(PuzzleRef::Random), PuzzleRef::Id(7));

        let hidden = PuzzleStart {
            category_id: None,
            ..start
        };
        assert_eq!(hidden.session_ref(PuzzleRef::HiddenDaily), PuzzleRef::HiddenDaily);
    }

    #[test]
    fn test_guess_response_shape() {
        assert_eq!(
            serde_json::to_value(GuessResponse::not_found()).unwrap(),
            json!({ "found": false })
        );
        assert_eq!(
            serde_json::to_value(GuessResponse::found(2, "élan".into())).unwrap(),
            json!({ "found": true, "index": 2, "displayWord": "élan" })
        );

        let parsed: GuessResponse = serde_json::from_str(r#"{"found":true,"index":1}"#).unwrap();
        assert_eq!(parsed.index, Some(1));
        assert_eq!(parsed.display_word, None);
    }

    #[test]
    fn test_blob_survives_base64() {
        let filter = BloomFilter::from_words(["cat", "dog", "bird"], 0.01).unwrap();
        let start = PuzzleStart {
            word_lengths: vec![4, 3, 3],
            bloom_filter: encode_blob(&filter.to_bytes()),
            category_name: "Pets".into(),
            category_id: None,
        };
        assert_eq!(start.filter().unwrap(), filter);
    }

    #[test]
    fn test_bad_base64_is_reported() {
        let start = PuzzleStart {
            word_lengths: vec![],
            bloom_filter: "not base64!".into(),
            category_name: String::new(),
            category_id: None,
        };
        assert!(matches!(start.filter(), Err(crate::Error::Base64(_))));
    }
}
