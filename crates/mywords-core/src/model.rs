//! Data model shared by every store
//!
//! A [`Word`] is the only persisted entity. It belongs to exactly one
//! [`Owner`]: a guest identifier on the device, or a user identifier in the
//! durable store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Learning status, the only field mutated after creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Not yet learned (default)
    #[default]
    Unlearned,
    /// Marked as learned
    Learned,
}

impl WordStatus {
    /// The opposite status (flashcard toggle)
    pub fn toggled(self) -> Self {
        match self {
            WordStatus::Unlearned => WordStatus::Learned,
            WordStatus::Learned => WordStatus::Unlearned,
        }
    }

    /// Wire name, as stored in the durable store
    pub fn as_str(self) -> &'static str {
        match self {
            WordStatus::Unlearned => "unlearned",
            WordStatus::Learned => "learned",
        }
    }
}

impl fmt::Display for WordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WordStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unlearned" => Ok(WordStatus::Unlearned),
            "learned" => Ok(WordStatus::Learned),
            other => Err(crate::Error::validation(format!(
                "Unknown word status '{}', expected 'learned' or 'unlearned'",
                other
            ))),
        }
    }
}

/// Optional enrichment fields, carried through unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_meaning: Option<String>,
}

impl DetailedInfo {
    /// True when no enrichment field is set
    pub fn is_empty(&self) -> bool {
        self.part_of_speech.is_none()
            && self.plural.is_none()
            && self.synonyms.as_ref().is_none_or(|s| s.is_empty())
            && self.root.is_none()
            && self.affix.is_none()
            && self.detailed_meaning.is_none()
    }
}

/// A saved vocabulary word
///
/// Serialized in the same camelCase shape the web client keeps in
/// `localStorage`, with `createdAt` as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Opaque id, stable for the word's lifetime
    pub id: String,
    /// Lowercase canonical form
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: WordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_info: Option<DetailedInfo>,
}

impl Word {
    /// Create a new unlearned word with a fresh id and the current time
    pub fn new(word: impl AsRef<str>, meaning: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            word: word.as_ref().trim().to_lowercase(),
            phonetic: None,
            meaning: meaning.into(),
            example: None,
            created_at: Utc::now(),
            status: WordStatus::Unlearned,
            detailed_info: None,
        }
    }

    /// Uniqueness key within an owner's collection
    pub fn key(&self) -> String {
        self.word.to_lowercase()
    }

    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = Some(phonetic.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_detailed_info(mut self, info: DetailedInfo) -> Self {
        self.detailed_info = if info.is_empty() { None } else { Some(info) };
        self
    }
}

/// Sort a collection newest first
pub fn sort_newest_first(words: &mut [Word]) {
    words.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Identifier of an anonymous, device-local owner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a collision-resistant identifier: timestamp plus random suffix
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "guest-{}-{}",
            Utc::now().timestamp_millis(),
            &suffix[..13]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an authenticated user, issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner of a word collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Guest(GuestId),
    User(UserId),
}

/// An authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

/// A session issued by the identity provider
///
/// The Debug implementation intentionally does NOT expose the tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    /// Whether the access token has passed its expiry time
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<REDACTED>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<REDACTED>"))
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Result of a sign-up request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The identity is already confirmed and a session was issued
    Confirmed(Session),
    /// A confirmation email was sent; no session yet
    ConfirmationPending { email: String },
}
