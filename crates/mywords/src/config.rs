//! Client configuration from environment variables
//!
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` (required)
//! - `MYWORDS_API_URL`: base URL of `mywordsd` (default `http://127.0.0.1:3000`)
//! - `MYWORDS_EMAIL_REDIRECT`: where confirmation emails land (`<api>/auth/callback` by default)
//! - `MYWORDS_DATA_DIR`: device storage directory (default: the platform data dir + `mywords`)
//! - `MYWORDS_LOG_LEVEL`: log level when `-v` is not given

use anyhow::{Context, Result};
use mywords_core::config::{BackendConfig, ClientConfig, DeviceStorageConfig, OracleConfig};
use mywords_core::gate::AUTH_CALLBACK_PATH;
use mywords_core::MywordsConfig;
use std::path::PathBuf;

const DEVICE_FILE: &str = "device.json";

pub struct CliConfig {
    pub supabase_url: String,
    /// ⚠️ NEVER log this value
    pub supabase_anon_key: String,
    pub api_url: Option<String>,
    pub email_redirect_to: Option<String>,
    pub data_dir: PathBuf,
    pub log_level: Option<String>,
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok(), dirs::data_local_dir())
    }

    pub fn from_vars(
        var: impl Fn(&str) -> Option<String>,
        platform_data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let required = |name: &str| {
            var(name)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} is required. Set it via: export {}=...", name, name))
        };

        let data_dir = match var("MYWORDS_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => platform_data_dir
                .map(|d| d.join("mywords"))
                .context("No data directory found; set MYWORDS_DATA_DIR")?,
        };

        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            api_url: var("MYWORDS_API_URL"),
            email_redirect_to: var("MYWORDS_EMAIL_REDIRECT"),
            data_dir,
            log_level: var("MYWORDS_LOG_LEVEL"),
        })
    }

    pub fn device_path(&self) -> PathBuf {
        self.data_dir.join(DEVICE_FILE)
    }

    /// Library-side configuration, validated
    pub fn core(&self) -> Result<MywordsConfig> {
        let mut client = ClientConfig::default();
        if let Some(url) = &self.api_url {
            client.api_url = url.trim_end_matches('/').to_string();
        }
        client.email_redirect_to = Some(
            self.email_redirect_to
                .clone()
                .unwrap_or_else(|| format!("{}{}", client.api_url, AUTH_CALLBACK_PATH)),
        );

        let config = MywordsConfig {
            device: DeviceStorageConfig::File {
                path: self.device_path().to_string_lossy().into_owned(),
            },
            backend: BackendConfig::Supabase {
                url: self.supabase_url.clone(),
                anon_key: self.supabase_anon_key.clone(),
            },
            // Lookups and stories go through mywordsd; the client holds no oracle key
            oracle: OracleConfig::Custom {
                factory: "mywordsd".to_string(),
                config: serde_json::json!({}),
            },
            client,
        };
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
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
        ("SUPABASE_ANON_KEY", "anon"),
    ];

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_vars(vars(BASE), Some(PathBuf::from("/home/u/.local/share"))).unwrap();
        assert_eq!(
            config.device_path(),
            PathBuf::from("/home/u/.local/share/mywords/device.json")
        );

        let core = config.core().unwrap();
        assert_eq!(core.client.api_url, "http://127.0.0.1:3000");
        assert_eq!(
            core.client.email_redirect_to.as_deref(),
            Some("http://127.0.0.1:3000/auth/callback")
        );
    }

    #[test]
    fn test_data_dir_override() {
        let mut pairs = BASE.to_vec();
        pairs.push(("MYWORDS_DATA_DIR", "/tmp/mw"));
        let config = CliConfig::from_vars(vars(&pairs), None).unwrap();
        assert_eq!(config.device_path(), PathBuf::from("/tmp/mw/device.json"));
    }

    #[test]
    fn test_missing_data_dir_is_an_error() {
        assert!(CliConfig::from_vars(vars(BASE), None).is_err());
    }

    #[test]
    fn test_missing_backend_is_an_error() {
        let err = CliConfig::from_vars(vars(&BASE[..1]), Some(PathBuf::from("/data")))
            .err()
            .unwrap();
        assert!(err.to_string().contains("SUPABASE_ANON_KEY"));
    }
}
