// # Supabase Word Store
//
// PostgREST access to the `words` table:
//
// | column        | type        | maps to             |
// |---------------|-------------|---------------------|
// | id            | uuid        | `Word::id`          |
// | user_id       | uuid        | session user        |
// | word          | text        | `Word::word`        |
// | definition    | text        | `Word::meaning`     |
// | phonetic      | text null   | `Word::phonetic`    |
// | example       | text null   | `Word::example`     |
// | status        | text        | `Word::status`      |
// | detailed_info | jsonb null  | `Word::detailed_info` |
// | created_at    | timestamptz | `Word::created_at`  |
//
// Every request filters on `user_id` as well as relying on row-level security.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mywords_core::model::{DetailedInfo, Session, Word, WordStatus};
use mywords_core::traits::RemoteWordStore;
use mywords_core::{Error, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{SERVICE, SupabaseClient};

const TABLE: &str = "words";

/// PostgREST-backed word store
#[derive(Debug, Clone)]
pub struct SupabaseWordStore {
    client: SupabaseClient,
}

/// A row as read from the table
#[derive(Debug, Deserialize)]
struct DbWord {
    id: String,
    word: String,
    definition: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    status: Option<WordStatus>,
    #[serde(default)]
    detailed_info: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<DbWord> for Word {
    fn from(row: DbWord) -> Self {
        let detailed_info = row
            .detailed_info
            .and_then(|v| serde_json::from_value::<DetailedInfo>(v).ok())
            .filter(|info| !info.is_empty());

        Word {
            id: row.id,
            word: row.word,
            phonetic: row.phonetic.filter(|p| !p.is_empty()),
            meaning: row.definition,
            example: row.example.filter(|e| !e.is_empty()),
            created_at: row.created_at,
            status: row.status.unwrap_or_default(),
            detailed_info,
        }
    }
}

/// A row as inserted; the table assigns `id`
#[derive(Debug, Serialize)]
struct NewDbWord<'a> {
    user_id: &'a str,
    word: String,
    definition: &'a str,
    phonetic: Option<&'a str>,
    example: Option<&'a str>,
    status: WordStatus,
    detailed_info: Option<&'a DetailedInfo>,
    created_at: DateTime<Utc>,
}

impl<'a> NewDbWord<'a> {
    fn new(user_id: &'a str, word: &'a Word) -> Self {
        Self {
            user_id,
            word: word.key(),
            definition: &word.meaning,
            phonetic: word.phonetic.as_deref(),
            example: word.example.as_deref(),
            status: word.status,
            detailed_info: word.detailed_info.as_ref(),
            created_at: word.created_at,
        }
    }
}

impl SupabaseWordStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    fn table_request(&self, method: Method, session: &Session) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.client.rest_url(TABLE), Some(&session.access_token))
            .query(&[("user_id", format!("eq.{}", session.user_id()))])
    }
}

#[async_trait]
impl RemoteWordStore for SupabaseWordStore {
    async fn select_words(&self, session: &Session) -> Result<Vec<Word>> {
        let request = self
            .table_request(Method::GET, session)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let rows: Vec<DbWord> = self
            .client
            .send(request, "select words")
            .await?
            .json()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("select words: failed to parse rows: {}", e)))?;

        tracing::debug!(count = rows.len(), "Fetched words");
        Ok(rows.into_iter().map(Word::from).collect())
    }

    async fn find_word_id(&self, session: &Session, word_lower: &str) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct IdRow {
            id: String,
        }

        let request = self.table_request(Method::GET, session).query(&[
            ("select", "id".to_string()),
            ("word", format!("eq.{}", word_lower)),
            ("limit", "1".to_string()),
        ]);

        let rows: Vec<IdRow> = self
            .client
            .send(request, "find word")
            .await?
            .json()
            .await
            .map_err(|e| Error::backend(SERVICE, format!("find word: failed to parse rows: {}", e)))?;

        Ok(rows.into_iter().next().map(|r| r.id))
    }

    async fn insert_word(&self, session: &Session, word: &Word) -> Result<()> {
        let row = NewDbWord::new(session.user_id().as_str(), word);
        let request = self
            .client
            .request(Method::POST, &self.client.rest_url(TABLE), Some(&session.access_token))
            .header("Prefer", "return=minimal")
            .json(&row);

        self.client.send(request, "insert word").await?;
        tracing::debug!(word = %row.word, "Inserted word");
        Ok(())
    }

    async fn delete_word(&self, session: &Session, word_id: &str) -> Result<()> {
        let request = self
            .table_request(Method::DELETE, session)
            .query(&[("id", format!("eq.{}", word_id))]);
        self.client.send(request, "delete word").await?;
        Ok(())
    }

    async fn update_status(
        &self,
        session: &Session,
        word_id: &str,
        status: WordStatus,
    ) -> Result<()> {
        let request = self
            .table_request(Method::PATCH, session)
            .query(&[("id", format!("eq.{}", word_id))])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "status": status }));
        self.client.send(request, "update status").await?;
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "supabase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_maps_definition_to_meaning() {
        let json = r#"{
            "id": "0b9e",
            "user_id": "u1",
            "word": "cat",
            "definition": "猫",
            "phonetic": "/kæt/",
            "example": null,
            "status": "learned",
            "detailed_info": {"partOfSpeech": "noun"},
            "created_at": "2025-01-09T12:00:00.123456+00:00",
            "updated_at": "2025-01-09T12:00:00.123456+00:00"
        }"#;
        let word: Word = serde_json::from_str::<DbWord>(json).unwrap().into();

        assert_eq!(word.meaning, "猫");
        assert_eq!(word.status, WordStatus::Learned);
        assert_eq!(word.example, None);
        assert_eq!(
            word.detailed_info.unwrap().part_of_speech.as_deref(),
            Some("noun")
        );
    }

    #[test]
    fn test_row_defaults() {
        let json = r#"{"id": "1", "word": "dog", "definition": "狗", "status": null,
                       "detailed_info": "not an object", "created_at": "2025-01-09T12:00:00Z"}"#;
        let word: Word = serde_json::from_str::<DbWord>(json).unwrap().into();
        assert_eq!(word.status, WordStatus::Unlearned);
        assert!(word.detailed_info.is_none());
    }

    #[test]
    fn test_insert_row_shape() {
        let word = Word::new("Cat", "feline").with_phonetic("/kæt/");
        let json = serde_json::to_value(NewDbWord::new("u1", &word)).unwrap();

        assert_eq!(json["user_id"], "u1");
        assert_eq!(json["word"], "cat");
        assert_eq!(json["definition"], "feline");
        assert_eq!(json["status"], "unlearned");
        assert!(json.get("id").is_none());
        assert!(json["example"].is_null());
    }
}
