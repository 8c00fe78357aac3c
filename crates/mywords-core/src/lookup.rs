//! Word lookup through the text oracle
//!
//! Asks the oracle for a dictionary record and turns whatever comes back
//! into a [`WordEntry`]. Malformed output never reaches the caller: fields
//! are scraped from the raw text, and anything still missing gets a
//! placeholder.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{DetailedInfo, Word};
use crate::traits::{CompletionRequest, TextOracle};

/// Default language of `meaning` and `detailedMeaning`
pub const DEFAULT_MEANING_LANGUAGE: &str = "Simplified Chinese";

const LOOKUP_TEMPERATURE: f32 = 0.3;
const LOOKUP_MAX_TOKENS: u32 = 1000;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?").expect("valid regex"));
static PHONETIC_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)phonetic["\s:]+([^",}\n]+)"#).expect("valid regex"));
static MEANING_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)meaning["\s:]+([^",}\n]+)"#).expect("valid regex"));
static EXAMPLE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)example["\s:]+([^",}\n]+)"#).expect("valid regex"));

/// A looked-up dictionary entry, as returned by `GET /api/word`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    pub word: String,
    pub phonetic: String,
    pub meaning: String,
    pub example: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_info: Option<DetailedInfo>,
}

impl WordEntry {
    /// A new unlearned [`Word`] built from this entry
    pub fn into_word(self) -> Word {
        let word = Word::new(&self.word, self.meaning)
            .with_phonetic(self.phonetic)
            .with_example(self.example);
        match self.detailed_info {
            Some(info) => word.with_detailed_info(info),
            None => word,
        }
    }
}

/// The record shape the oracle is asked to produce
#[derive(Debug, Default)]
struct OracleRecord {
    phonetic: Option<String>,
    meaning: Option<String>,
    example: Option<String>,
    part_of_speech: Option<String>,
    plural: Option<String>,
    synonyms: Option<Vec<String>>,
    root: Option<String>,
    affix: Option<String>,
    detailed_meaning: Option<String>,
}

impl OracleRecord {
    /// Pull each field out on its own so one badly typed value only loses itself
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(text_of);
        Self {
            phonetic: text("phonetic"),
            meaning: text("meaning"),
            example: text("example"),
            part_of_speech: text("partOfSpeech"),
            plural: text("plural"),
            synonyms: value.get("synonyms").and_then(synonyms_of),
            root: text("root"),
            affix: text("affix"),
            detailed_meaning: text("detailedMeaning"),
        }
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts = items.iter().filter_map(text_of).collect::<Vec<_>>();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn synonyms_of(value: &Value) -> Option<Vec<String>> {
    let list: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(text_of).collect(),
        Value::String(s) => s.split([',', ';']).map(str::to_string).collect(),
        _ => return None,
    };
    Some(
        list.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

/// Dictionary lookups backed by a [`TextOracle`]
#[derive(Clone)]
pub struct LookupService {
    oracle: Arc<dyn TextOracle>,
    meaning_language: String,
}

impl LookupService {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self {
            oracle,
            meaning_language: DEFAULT_MEANING_LANGUAGE.to_string(),
        }
    }

    pub fn with_meaning_language(mut self, language: impl Into<String>) -> Self {
        self.meaning_language = language.into();
        self
    }

    /// Look up a single word
    ///
    /// # Errors
    ///
    /// - `Error::Validation` for empty input, before any oracle call
    /// - `Error::Backend` when the oracle cannot be reached
    pub async fn lookup(&self, word: &str) -> Result<WordEntry> {
        let word = word.trim();
        if word.is_empty() {
            return Err(Error::validation("Please provide a word"));
        }

        let content = self.oracle.complete(&self.prompt(word)).await?;
        tracing::debug!(word = %word, oracle = self.oracle.oracle_name(), "Oracle answered lookup");
        Ok(parse_entry(word, &content))
    }

    fn prompt(&self, word: &str) -> CompletionRequest {
        let lang = &self.meaning_language;
        CompletionRequest {
            system: format!(
                "You are a professional English dictionary assistant. Answer with JSON only: \
                 {{\"phonetic\": \"IPA\", \"meaning\": \"concise {lang} meaning for a flashcard\", \
                 \"example\": \"English example sentence\", \"partOfSpeech\": \"part of speech\", \
                 \"plural\": \"plural form if a noun\", \"synonyms\": [\"synonym\"], \
                 \"root\": \"word root\", \"affix\": \"affixes\", \
                 \"detailedMeaning\": \"detailed {lang} meaning\"}}. Do not add any other text."
            ),
            user: format!(
                "Look up the word \"{word}\". Requirements:\n\
                 1. phonetic uses IPA, e.g. /ˈwɜːrd/\n\
                 2. meaning: a concise {lang} definition (1-2 sentences)\n\
                 3. detailedMeaning: a detailed {lang} explanation including usage and context\n\
                 4. partOfSpeech: noun/verb/adjective/adverb/...\n\
                 5. plural: the plural form for nouns, empty otherwise\n\
                 6. synonyms: 2-3 common synonyms\n\
                 7. root: the word root, if any\n\
                 8. affix: prefixes or suffixes, if any\n\
                 9. example: a natural, practical English sentence\n\
                 10. Return JSON only"
            ),
            temperature: LOOKUP_TEMPERATURE,
            max_tokens: LOOKUP_MAX_TOKENS,
        }
    }
}

/// Turn oracle output into an entry, falling back to text extraction
fn parse_entry(word: &str, content: &str) -> WordEntry {
    let record = match parse_record(content) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(word = %word, "{}; extracting fields from text", e);
            extract_record(content)
        }
    };

    let lower = word.to_lowercase();
    let info = DetailedInfo {
        part_of_speech: non_empty(record.part_of_speech),
        plural: non_empty(record.plural),
        synonyms: record.synonyms.filter(|s| !s.is_empty()),
        root: non_empty(record.root),
        affix: non_empty(record.affix),
        detailed_meaning: non_empty(record.detailed_meaning),
    };

    WordEntry {
        phonetic: non_empty(record.phonetic).unwrap_or_else(|| format!("/{}/", lower)),
        meaning: non_empty(record.meaning)
            .unwrap_or_else(|| format!("Meaning of \"{}\" is unavailable", word)),
        example: non_empty(record.example)
            .unwrap_or_else(|| format!("This is an example sentence using \"{}\".", word)),
        detailed_info: (!info.is_empty()).then_some(info),
        word: lower,
    }
}

fn parse_record(content: &str) -> Result<OracleRecord> {
    let stripped = CODE_FENCE.replace_all(content, "");
    let value: Value = serde_json::from_str(stripped.trim())
        .map_err(|e| Error::malformed(format!("oracle output is not JSON: {}", e)))?;
    if !value.is_object() {
        return Err(Error::malformed("oracle output is not a JSON record"));
    }
    Ok(OracleRecord::from_value(&value))
}

fn extract_record(content: &str) -> OracleRecord {
    let capture = |re: &Regex| {
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    OracleRecord {
        phonetic: capture(&PHONETIC_FIELD),
        meaning: capture(&MEANING_FIELD),
        example: capture(&EXAMPLE_FIELD),
        ..OracleRecord::default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
