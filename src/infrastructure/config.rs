use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::application::history_store::MAX_HISTORY;
use crate::domain::error::ConfigError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SourceSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: Option<String>,
}

#[derive(Deserialize, Clone, PartialEq)]
pub struct SourceCredentials {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

impl fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("table", &self.table)
            .finish()
    }
}

impl SourceSettings {
    /// All three parameters are required before connecting.
    pub fn credentials(&self) -> Result<SourceCredentials, ConfigError> {
        fn present(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        let url = present(&self.url);
        let api_key = present(&self.api_key);
        let table = present(&self.table);

        match (url, api_key, table) {
            (Some(url), Some(api_key), Some(table)) => Ok(SourceCredentials {
                url,
                api_key,
                table,
            }),
            (url, api_key, table) => {
                let mut missing = Vec::new();
                if url.is_none() {
                    missing.push(ENV_URL[0]);
                }
                if api_key.is_none() {
                    missing.push(ENV_API_KEY[0]);
                }
                if table.is_none() {
                    missing.push(ENV_TABLE[0]);
                }
                Err(ConfigError::MissingParameters(missing))
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeedSettings {
    pub history_limit: usize,
    pub fetch_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub retry_delay_ms: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            history_limit: MAX_HISTORY,
            fetch_timeout_ms: 10_000,
            poll_interval_ms: 2_000,
            retry_delay_ms: 5_000,
        }
    }
}

impl FeedSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

const ENV_URL: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
const ENV_API_KEY: [&str; 2] = ["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];
const ENV_TABLE: [&str; 2] = ["SUPABASE_TABLE_NAME", "NEXT_PUBLIC_SUPABASE_TABLE_NAME"];

/// Defaults, then `config/dashboard.*`, then `DASHBOARD__*` variables, then
/// the well-known Supabase variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        );

    build_app_config(builder, |name| std::env::var(name).ok())
}

fn build_app_config(
    mut builder: config::ConfigBuilder<config::builder::DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AppConfig> {
    for (key, names) in [
        ("source.url", ENV_URL),
        ("source.api_key", ENV_API_KEY),
        ("source.table", ENV_TABLE),
    ] {
        if let Some(value) = names.iter().find_map(|name| lookup(name)) {
            builder = builder.set_override(key, value)?;
        }
    }

    let settings = builder.build()?;
    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};
    use std::collections::HashMap;

    fn build(toml: &str, env: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        build_app_config(builder, |name| env.get(name).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = build("", &[]);
        assert_eq!(config.feed, FeedSettings::default());
        assert_eq!(config.feed.history_limit, 1000);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert!(config.source.url.is_none());
    }

    #[test]
    fn test_file_values() {
        let config = build(
            r#"
            [source]
            url = "https://example.supabase.co"
            api_key = "anon"
            table = "leituras"

            [feed]
            poll_interval_ms = 500
            "#,
            &[],
        );
        let credentials = config.source.credentials().unwrap();
        assert_eq!(credentials.table, "leituras");
        assert_eq!(config.feed.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.feed.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_well_known_env_overrides_file() {
        let config = build(
            r#"
            [source]
            table = "from_file"
            "#,
            &[
                ("NEXT_PUBLIC_SUPABASE_URL", "https://a.supabase.co"),
                ("SUPABASE_ANON_KEY", "key"),
                ("SUPABASE_TABLE_NAME", "from_env"),
            ],
        );
        let credentials = config.source.credentials().unwrap();
        assert_eq!(credentials.url, "https://a.supabase.co");
        assert_eq!(credentials.table, "from_env");
    }

    #[test]
    fn test_missing_parameters_are_all_named() {
        let settings = SourceSettings {
            url: Some("https://a.supabase.co".to_string()),
            api_key: Some("   ".to_string()),
            table: None,
        };
        assert_eq!(
            settings.credentials(),
            Err(ConfigError::MissingParameters(vec![
                "SUPABASE_ANON_KEY",
                "SUPABASE_TABLE_NAME"
            ]))
        );
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let credentials = SourceCredentials {
            url: "https://a.supabase.co".to_string(),
            api_key: "secret".to_string(),
            table: "t".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("secret"));
    }
}
