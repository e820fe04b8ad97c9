use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct IdeateConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which session store implementation backs the service.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Falls back to `DATABASE_URL` when empty.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl DatabaseConfig {
    pub fn resolved_url(&self) -> Option<String> {
        if !self.url.is_empty() {
            return Some(self.url.clone());
        }
        std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CompletionConfig {
    /// Filled from `OPENAI_API_KEY` by `IdeateConfig::load` when absent.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl CompletionConfig {
    /// Use `fallback` when no non-empty key is configured.
    pub fn fill_api_key(&mut self, fallback: Option<String>) {
        if self.api_key.as_deref().map_or(true, str::is_empty) {
            self.api_key = fallback.filter(|k| !k.is_empty());
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl IdeateConfig {
    /// Load from a TOML file, then apply `IDEATE__SECTION__KEY` env overrides.
    /// A missing completion key is taken from `OPENAI_API_KEY`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("IDEATE").separator("__"))
            .build()?;
        let mut config: Self = s.try_deserialize()?;
        config
            .completion
            .fill_api_key(std::env::var("OPENAI_API_KEY").ok());
        Ok(config)
    }

    /// Parse from an inline TOML string. No environment overrides.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = IdeateConfig::from_toml(
            r#"
            [database]
            url = "postgresql://localhost/ideate"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.base_url, "https://api.openai.com");
        assert_eq!(config.http.port, 8000);
        assert_eq!(config.service.log_level, "info");
    }

    #[test]
    fn test_memory_backend_parses() {
        let config = IdeateConfig::from_toml(
            r#"
            [database]
            backend = "memory"

            [http]
            host = "0.0.0.0"
            port = 9100
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 9100);
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let mut completion = CompletionConfig {
            api_key: Some("sk-from-config".to_string()),
            ..CompletionConfig::default()
        };
        completion.fill_api_key(Some("sk-from-env".to_string()));
        assert_eq!(completion.api_key.as_deref(), Some("sk-from-config"));
    }

    #[test]
    fn test_empty_api_key_takes_fallback() {
        let mut completion = CompletionConfig {
            api_key: Some(String::new()),
            ..CompletionConfig::default()
        };
        completion.fill_api_key(Some("sk-from-env".to_string()));
        assert_eq!(completion.api_key.as_deref(), Some("sk-from-env"));

        let mut completion = CompletionConfig::default();
        completion.fill_api_key(Some(String::new()));
        assert_eq!(completion.api_key, None);
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let database = DatabaseConfig {
            backend: StoreBackend::Postgres,
            url: "postgresql://db/ideate".to_string(),
            max_connections: 2,
        };
        assert_eq!(
            database.resolved_url().as_deref(),
            Some("postgresql://db/ideate")
        );
    }

    #[test]
    fn test_missing_database_section_fails() {
        assert!(IdeateConfig::from_toml("[http]\nport = 1\n").is_err());
    }
}
