//! Story generation
//!
//! Two sequential oracle calls: compose an English story that uses every
//! selected word, then translate it. The word count is checked before the
//! first call. A failed translation still returns the story.

use std::sync::Arc;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traits::{CompletionRequest, TextOracle};

pub const MIN_STORY_WORDS: usize = 10;
pub const MAX_STORY_WORDS: usize = 20;

/// Returned in place of a translation that could not be produced
pub const TRANSLATION_UNAVAILABLE: &str = "Translation failed, please try again";

const STORY_TEMPERATURE: f32 = 0.7;
const TRANSLATION_TEMPERATURE: f32 = 0.3;
const STORY_MAX_TOKENS: u32 = 1500;

/// A selected word with its meaning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryWord {
    pub word: String,
    pub meaning: String,
}

impl From<&crate::model::Word> for StoryWord {
    fn from(word: &crate::model::Word) -> Self {
        Self {
            word: word.word.clone(),
            meaning: word.meaning.clone(),
        }
    }
}

/// A generated story and its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub english_text: String,
    pub translated_text: String,
    /// False when `translated_text` is the placeholder
    pub translated: bool,
}

impl Story {
    fn untranslated(english_text: String) -> Self {
        Self {
            english_text,
            translated_text: TRANSLATION_UNAVAILABLE.to_string(),
            translated: false,
        }
    }
}

/// Reject selections outside `[MIN_STORY_WORDS, MAX_STORY_WORDS]`
pub fn validate_word_count(count: usize) -> Result<()> {
    if !(MIN_STORY_WORDS..=MAX_STORY_WORDS).contains(&count) {
        return Err(Error::validation(format!(
            "Please select between {} and {} words (got {})",
            MIN_STORY_WORDS, MAX_STORY_WORDS, count
        )));
    }
    Ok(())
}

/// Story generation backed by a [`TextOracle`]
#[derive(Clone)]
pub struct StoryService {
    oracle: Arc<dyn TextOracle>,
    target_language: String,
}

impl StoryService {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self {
            oracle,
            target_language: crate::lookup::DEFAULT_MEANING_LANGUAGE.to_string(),
        }
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    /// Generate a story using every word, plus its translation
    ///
    /// # Errors
    ///
    /// - `Error::Validation` when the word count is out of range (no oracle call)
    /// - `Error::Backend` when the story itself cannot be generated
    pub async fn generate(&self, words: &[StoryWord]) -> Result<Story> {
        validate_word_count(words.len())?;

        let english_text = self
            .oracle
            .complete(&story_prompt(words))
            .await?
            .trim()
            .to_string();
        if english_text.is_empty() {
            return Err(Error::backend(
                self.oracle.oracle_name(),
                "story generation returned no text",
            ));
        }
        tracing::debug!(words = words.len(), "Story generated");

        let translation = self
            .oracle
            .complete(&self.translation_prompt(&english_text))
            .await
            .map(|text| text.trim().to_string());

        Ok(match translation {
            Ok(translated_text) if !translated_text.is_empty() => Story {
                english_text,
                translated_text,
                translated: true,
            },
            Ok(_) => {
                tracing::warn!("Story translation came back empty, returning story only");
                Story::untranslated(english_text)
            }
            Err(e) => {
                tracing::warn!("Story translation failed, returning story only: {}", e);
                Story::untranslated(english_text)
            }
        })
    }

    fn translation_prompt(&self, story: &str) -> CompletionRequest {
        let lang = &self.target_language;
        CompletionRequest {
            system: format!(
                "You are a professional translator. Translate English text into {lang} \
                 accurately and fluently, keeping the tone and style of the original."
            ),
            user: format!(
                "Translate the following English text into {lang}:\n\n{story}\n\n\
                 Requirements:\n\
                 1. Accurate and fluent\n\
                 2. Keep the tone and style of the original\n\
                 3. Return only the translation, without any explanation"
            ),
            temperature: TRANSLATION_TEMPERATURE,
            max_tokens: STORY_MAX_TOKENS,
        }
    }
}

fn story_prompt(words: &[StoryWord]) -> CompletionRequest {
    let list = words
        .iter()
        .map(|w| format!("{} ({})", w.word, w.meaning))
        .collect::<Vec<_>>()
        .join(", ");

    CompletionRequest {
        system: "You are a professional English learning assistant. Weave the given words \
                 into a coherent story or news piece of about 300 words, making sure every \
                 word fits naturally. The story should be interesting and meaningful."
            .to_string(),
        user: format!(
            "Write an English story of about 300 words using these words: {list}\n\n\
             Requirements:\n\
             1. Logically coherent, interesting and meaningful\n\
             2. Every word appears naturally in the text\n\
             3. Between 250 and 350 words\n\
             4. Return only the story, without any explanation"
        ),
        temperature: STORY_TEMPERATURE,
        max_tokens: STORY_MAX_TOKENS,
    }
}

/// A piece of story text, highlighted when it is one of the selected words
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Highlight(String),
}

/// Split `text` into plain and highlighted segments
///
/// Matching is case-insensitive and on whole words only. The original casing
/// of the text is kept.
pub fn highlight(text: &str, words: &[&str]) -> Vec<Segment> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() || text.is_empty() {
        return vec![Segment::Plain(text.to_string())];
    }

    let pattern = format!(r"\b({})\b", alternatives.join("|"));
    let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return vec![Segment::Plain(text.to_string())];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Plain(text[last..m.start()].to_string()));
        }
        segments.push(Segment::Highlight(m.as_str().to_string()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Plain(text[last..].to_string()));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_bounds() {
        assert!(validate_word_count(9).is_err());
        assert!(validate_word_count(10).is_ok());
        assert!(validate_word_count(20).is_ok());
        assert!(matches!(
            validate_word_count(21),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_highlight_whole_words_case_insensitive() {
        let segments = highlight("The Cat sat on a catalog.", &["cat"]);
        assert_eq!(
            segments,
            vec![
                Segment::Plain("The ".to_string()),
                Segment::Highlight("Cat".to_string()),
                Segment::Plain(" sat on a catalog.".to_string()),
            ]
        );
    }

    #[test]
    fn test_highlight_escapes_words() {
        let segments = highlight("a+b equals c", &["a+b", ""]);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::Highlight("a+b".to_string()));
    }

    #[test]
    fn test_story_prompt_lists_every_word() {
        let words: Vec<StoryWord> = (0..10)
            .map(|i| StoryWord {
                word: format!("w{}", i),
                meaning: "m".to_string(),
            })
            .collect();
        let prompt = story_prompt(&words);
        assert!(prompt.user.contains("w0, w1"));
        assert!(prompt.user.contains("w9"));
        assert_eq!(prompt.max_tokens, 1500);
    }
}
