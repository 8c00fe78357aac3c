//! Environment configuration for `mywordsd`
//!
//! All configuration is read from environment variables:
//!
//! | Variable                   | Required | Default                                        |
//! |----------------------------|----------|------------------------------------------------|
//! | `SUPABASE_URL`             | yes      |                                                |
//! | `SUPABASE_ANON_KEY`        | yes      |                                                |
//! | `DEEPSEEK_API_KEY`         | yes      |                                                |
//! | `DEEPSEEK_API_URL`         | no       | `https://api.deepseek.com/v1/chat/completions` |
//! | `DEEPSEEK_MODEL`           | no       | `deepseek-chat`                                |
//! | `MYWORDS_BIND`             | no       | `127.0.0.1`                                    |
//! | `MYWORDS_PORT`             | no       | `3000`                                         |
//! | `MYWORDS_MEANING_LANGUAGE` | no       | `Simplified Chinese`                           |
//! | `MYWORDS_STATIC_DIR`       | no       | (no static frontend)                           |
//! | `MYWORDS_LOG_LEVEL`        | no       | `info`                                         |

use anyhow::{Context, Result};
use mywords_core::config::{BackendConfig, ClientConfig, DeviceStorageConfig, OracleConfig};
use mywords_core::lookup::DEFAULT_MEANING_LANGUAGE;
use mywords_core::MywordsConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Server configuration
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub supabase_url: String,
    /// ⚠️ NEVER log this value
    pub supabase_anon_key: String,
    /// ⚠️ NEVER log this value
    pub deepseek_api_key: String,
    pub deepseek_api_url: Option<String>,
    pub deepseek_model: Option<String>,
    pub meaning_language: String,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            var(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is required. Set it via: export {}=...", name, name))
        };

        let port = match var("MYWORDS_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("MYWORDS_PORT must be a port number. Got: {}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            bind: var("MYWORDS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            deepseek_api_key: required("DEEPSEEK_API_KEY")?,
            deepseek_api_url: var("DEEPSEEK_API_URL"),
            deepseek_model: var("DEEPSEEK_MODEL"),
            meaning_language: var("MYWORDS_MEANING_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_MEANING_LANGUAGE.to_string()),
            static_dir: var("MYWORDS_STATIC_DIR").map(PathBuf::from),
            log_level: var("MYWORDS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks placeholder secrets, address and port, the static directory
    /// and the log level, then the library-side configuration.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("SUPABASE_ANON_KEY", &self.supabase_anon_key),
            ("DEEPSEEK_API_KEY", &self.deepseek_api_key),
        ] {
            if is_placeholder(value) {
                anyhow::bail!(
                    "{} appears to be a placeholder. Use the real key from your account.",
                    name
                );
            }
        }

        if self.bind.parse::<IpAddr>().is_err() {
            anyhow::bail!("MYWORDS_BIND must be an IP address. Got: {}", self.bind);
        }

        if self.port == 0 {
            anyhow::bail!("MYWORDS_PORT must be between 1 and 65535. Got: 0");
        }

        if let Some(dir) = &self.static_dir
            && !dir.is_dir()
        {
            anyhow::bail!("MYWORDS_STATIC_DIR is not a directory: {}", dir.display());
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MYWORDS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.core()
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if self.supabase_url.starts_with("http://") {
            eprintln!(
                "WARNING: SUPABASE_URL uses HTTP (not HTTPS). \
                Tokens will travel in clear text."
            );
        }

        Ok(())
    }

    /// Library-side configuration
    pub fn core(&self) -> MywordsConfig {
        let mut oracle = OracleConfig::deepseek(self.deepseek_api_key.clone());
        if let OracleConfig::DeepSeek { api_url, model, .. } = &mut oracle {
            if let Some(url) = &self.deepseek_api_url {
                *api_url = url.clone();
            }
            if let Some(name) = &self.deepseek_model {
                *model = name.clone();
            }
        }

        MywordsConfig {
            device: DeviceStorageConfig::Memory,
            backend: BackendConfig::Supabase {
                url: self.supabase_url.clone(),
                anon_key: self.supabase_anon_key.clone(),
            },
            oracle,
            client: ClientConfig {
                meaning_language: self.meaning_language.clone(),
                ..ClientConfig::default()
            },
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

fn is_placeholder(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.contains("your_")
        || lower.contains("replace_me")
        || lower.contains("example")
        || lower == "key"
        || lower == "changeme"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("SUPABASE_URL", "https://xyz.supabase.co"),
        ("SUPABASE_ANON_KEY", "eyJhbGciOiJIUzI1NiJ9.anon"),
        ("DEEPSEEK_API_KEY", "sk-4f1c0b7e"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(BASE)).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.meaning_language, "Simplified Chinese");
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_missing_oracle_key_is_an_error() {
        let err = Config::from_vars(vars(&BASE[..2])).err().unwrap();
        assert!(err.to_string().contains("DEEPSEEK_API_KEY"));
    }

    #[test]
    fn test_placeholder_key_rejected() {
        let mut pairs = BASE.to_vec();
        pairs[2] = ("DEEPSEEK_API_KEY", "your_deepseek_key");
        let config = Config::from_vars(vars(&pairs)).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_port_and_level() {
        let mut pairs = BASE.to_vec();
        pairs.push(("MYWORDS_PORT", "seventy"));
        assert!(Config::from_vars(vars(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("MYWORDS_LOG_LEVEL", "loud"));
        assert!(Config::from_vars(vars(&pairs)).unwrap().validate().is_err());
    }

    #[test]
    fn test_oracle_overrides_flow_into_core_config() {
        let mut pairs = BASE.to_vec();
        pairs.push(("DEEPSEEK_MODEL", "deepseek-reasoner"));
        let core = Config::from_vars(vars(&pairs)).unwrap().core();
        match core.oracle {
            OracleConfig::DeepSeek { model, api_url, .. } => {
                assert_eq!(model, "deepseek-reasoner");
                assert!(api_url.starts_with("https://api.deepseek.com"));
            }
            other => panic!("unexpected oracle config: {:?}", other),
        }
    }
}
