//! Configuration types for the MyWords system
//!
//! This module defines all configuration structures used throughout the crate.
//! Binaries build these from environment variables and call `validate()`.

use serde::{Deserialize, Serialize};

/// Main MyWords configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MywordsConfig {
    /// Device-local storage
    #[serde(default)]
    pub device: DeviceStorageConfig,

    /// Identity provider and durable word store
    pub backend: BackendConfig,

    /// Text oracle for lookups and stories
    pub oracle: OracleConfig,

    /// Client-side settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl MywordsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.device.validate()?;
        self.backend.validate()?;
        self.oracle.validate()?;
        self.client.validate()?;
        Ok(())
    }
}

/// Device storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceStorageConfig {
    /// JSON file on disk
    File {
        /// Path to the storage file
        path: String,
    },

    /// In-memory (lost on exit)
    #[default]
    Memory,

    /// Custom device storage
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl DeviceStorageConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            DeviceStorageConfig::File { path } if path.trim().is_empty() => Err(
                crate::Error::config("Device storage file path cannot be empty"),
            ),
            DeviceStorageConfig::Custom { factory, .. } if factory.is_empty() => Err(
                crate::Error::config("Custom device storage factory cannot be empty"),
            ),
            _ => Ok(()),
        }
    }

    /// Registry name of the storage backend
    pub fn type_name(&self) -> &str {
        match self {
            DeviceStorageConfig::File { .. } => "file",
            DeviceStorageConfig::Memory => "memory",
            DeviceStorageConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Identity provider + durable store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Supabase (GoTrue auth + PostgREST `words` table)
    Supabase {
        /// Project URL, e.g. `https://xyz.supabase.co`
        url: String,
        /// Public anon key
        anon_key: String,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl BackendConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BackendConfig::Supabase { url, anon_key } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Supabase URL cannot be empty"));
                }
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "Supabase URL must start with http:// or https:// (got '{}')",
                        url
                    )));
                }
                if anon_key.is_empty() {
                    return Err(crate::Error::config("Supabase anon key cannot be empty"));
                }
                Ok(())
            }
            BackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom backend factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom backend config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Registry name of the backend
    pub fn type_name(&self) -> &str {
        match self {
            BackendConfig::Supabase { .. } => "supabase",
            BackendConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Text oracle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleConfig {
    /// DeepSeek (OpenAI-compatible chat completions)
    #[serde(rename = "deepseek")]
    DeepSeek {
        /// API key
        api_key: String,
        /// Chat completions endpoint
        #[serde(default = "default_deepseek_url")]
        api_url: String,
        /// Model name
        #[serde(default = "default_deepseek_model")]
        model: String,
    },

    /// Custom oracle
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl OracleConfig {
    /// DeepSeek with default endpoint and model
    pub fn deepseek(api_key: impl Into<String>) -> Self {
        OracleConfig::DeepSeek {
            api_key: api_key.into(),
            api_url: default_deepseek_url(),
            model: default_deepseek_model(),
        }
    }

    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            OracleConfig::DeepSeek {
                api_key,
                api_url,
                model,
            } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("DeepSeek API key cannot be empty"));
                }
                if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                    return Err(crate::Error::config(format!(
                        "DeepSeek API URL must start with http:// or https:// (got '{}')",
                        api_url
                    )));
                }
                if model.is_empty() {
                    return Err(crate::Error::config("DeepSeek model cannot be empty"));
                }
                Ok(())
            }
            OracleConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom oracle factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom oracle config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Registry name of the oracle
    pub fn type_name(&self) -> &str {
        match self {
            OracleConfig::DeepSeek { .. } => "deepseek",
            OracleConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Supabase {
            url: String::new(),
            anon_key: String::new(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig::deepseek(String::new())
    }
}

/// Client-side settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of `mywordsd`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where sign-up confirmation emails send the user
    #[serde(default)]
    pub email_redirect_to: Option<String>,

    /// Language of meanings and story translations
    #[serde(default = "default_meaning_language")]
    pub meaning_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            email_redirect_to: None,
            meaning_language: default_meaning_language(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "API URL must start with http:// or https:// (got '{}')",
                self.api_url
            )));
        }
        if let Some(redirect) = &self.email_redirect_to
            && url::Url::parse(redirect).is_err()
        {
            return Err(crate::Error::config(format!(
                "Email redirect '{}' is not an absolute URL",
                redirect
            )));
        }
        Ok(())
    }
}

fn default_deepseek_url() -> String {
    "https://api.deepseek.com/v1/chat/completions".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_meaning_language() -> String {
    crate::lookup::DEFAULT_MEANING_LANGUAGE.to_string()
}
