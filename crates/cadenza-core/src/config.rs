//! Configuration module
//!
//! Environment-sourced settings for the relay server: provider credentials,
//! bind address, public URL used to build upload and callback links, upload
//! ceiling and storage directory.

use std::collections::HashMap;
use std::env;

const DEFAULT_SUNO_API_BASE_URL: &str = "https://api.sunoapi.org";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "::1", "0.0.0.0"];

/// Base configuration shared by the server and the CLI
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: String,
}

/// Relay configuration
#[derive(Clone)]
pub struct RelayConfig {
    pub base: BaseConfig,
    pub suno_api_key: String,
    pub suno_api_base_url: String,
    pub public_base_url: String,
    pub max_file_size_mb: u64,
    pub upload_dir: String,
    pub provider_timeout_secs: u64,
    // 0 keeps callback records for the life of the process
    pub callback_retention_secs: u64,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("base", &self.base)
            .field("suno_api_key", &mask_secret(&self.suno_api_key))
            .field("suno_api_base_url", &self.suno_api_base_url)
            .field("public_base_url", &self.public_base_url)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("upload_dir", &self.upload_dir)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("callback_retention_secs", &self.callback_retention_secs)
            .finish()
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<RelayConfig>);

impl Config {
    fn as_relay(&self) -> &RelayConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_relay().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit key/value map.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::from_source(|key| values.get(key).cloned())
    }

    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = RelayConfig::from_source(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_relay().validate(self.is_production())
    }

    pub fn host(&self) -> &str {
        &self.as_relay().base.host
    }

    pub fn server_port(&self) -> u16 {
        self.as_relay().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_relay().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_relay().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_relay().base.log_format
    }

    pub fn suno_api_key(&self) -> &str {
        &self.as_relay().suno_api_key
    }

    pub fn suno_api_base_url(&self) -> &str {
        &self.as_relay().suno_api_base_url
    }

    pub fn public_base_url(&self) -> &str {
        &self.as_relay().public_base_url
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.as_relay().max_file_size_mb
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.as_relay().max_file_size_mb * 1024 * 1024
    }

    pub fn upload_dir(&self) -> &str {
        &self.as_relay().upload_dir
    }

    pub fn provider_timeout_secs(&self) -> u64 {
        self.as_relay().provider_timeout_secs
    }

    pub fn callback_retention_secs(&self) -> u64 {
        self.as_relay().callback_retention_secs
    }

    /// URL the provider posts completion callbacks to.
    pub fn callback_url(&self) -> String {
        format!("{}/api/suno-callback", self.public_base_url())
    }

    /// Whether the public base URL points at a loopback address the provider cannot reach.
    pub fn public_base_url_is_loopback(&self) -> bool {
        is_loopback_url(self.public_base_url())
    }
}

impl RelayConfig {
    fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let suno_api_key = get("SUNO_API_KEY").unwrap_or_default();

        let suno_api_base_url = get("SUNO_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_SUNO_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let host = get("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let server_port = match get("BACKEND_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("BACKEND_PORT must be a valid port, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let max_file_size_mb = match get("MAX_FILE_SIZE_MB") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("MAX_FILE_SIZE_MB must be a whole number, got '{}'", raw)
            })?,
            None => DEFAULT_MAX_FILE_SIZE_MB,
        };

        let provider_timeout_secs = match get("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("PROVIDER_TIMEOUT_SECS must be a whole number, got '{}'", raw)
            })?,
            None => DEFAULT_PROVIDER_TIMEOUT_SECS,
        };

        let callback_retention_secs = match get("CALLBACK_RETENTION_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("CALLBACK_RETENTION_SECS must be a whole number, got '{}'", raw)
            })?,
            None => 0,
        };

        let upload_dir = get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = get("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string());

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            base: BaseConfig {
                host,
                server_port,
                cors_origins,
                environment,
                log_format,
            },
            suno_api_key,
            suno_api_base_url,
            public_base_url,
            max_file_size_mb,
            upload_dir,
            provider_timeout_secs,
            callback_retention_secs,
        })
    }

    fn validate(&self, is_production: bool) -> Result<(), anyhow::Error> {
        if self.suno_api_key.is_empty() {
            return Err(anyhow::anyhow!("SUNO_API_KEY must be set"));
        }

        for (name, url) in [
            ("SUNO_API_BASE_URL", &self.suno_api_base_url),
            ("PUBLIC_BASE_URL", &self.public_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "{} must start with http:// or https://, got '{}'",
                    name,
                    url
                ));
            }
        }

        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.provider_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PROVIDER_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if is_production && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if is_loopback_url(&self.public_base_url) {
            if is_production {
                return Err(anyhow::anyhow!(
                    "PUBLIC_BASE_URL '{}' is a loopback address; the provider cannot reach it",
                    self.public_base_url
                ));
            }
            tracing::warn!(
                public_base_url = %self.public_base_url,
                "PUBLIC_BASE_URL is a loopback address; provider callbacks and file fetches will fail"
            );
        }

        Ok(())
    }
}

/// Extract the host portion of an http(s) URL without pulling in a URL parser.
fn is_loopback_url(url: &str) -> bool {
    url_host(url)
        .map(|host| LOOPBACK_HOSTS.contains(&host))
        .unwrap_or(false)
}

fn url_host(url: &str) -> Option<&str> {
    let rest = url.split_once("://")?.1;
    let authority = rest.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    if authority.starts_with('[') {
        return authority.find(']').map(|end| &authority[..=end]);
    }
    Some(authority.split(':').next().unwrap_or(authority))
}

/// Mask a secret for display: first 8 characters followed by `*`.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(8).collect();
    format!("{}{}", visible, "*".repeat(secret.chars().count().saturating_sub(8).min(24)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_map(&map)
    }

    #[test]
    fn defaults_are_applied() {
        let config = config_with(&[("SUNO_API_KEY", "sk-test-123456")]).unwrap();
        assert_eq!(config.suno_api_base_url(), "https://api.sunoapi.org");
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.server_port(), 8000);
        assert_eq!(config.public_base_url(), "http://localhost:8000");
        assert_eq!(config.max_file_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.upload_dir(), "./uploads");
        assert_eq!(config.provider_timeout_secs(), 30);
        assert_eq!(config.callback_retention_secs(), 0);
        assert_eq!(config.cors_origins(), &["*".to_string()]);
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trailing_slashes_are_trimmed_from_urls() {
        let config = config_with(&[
            ("SUNO_API_KEY", "key"),
            ("PUBLIC_BASE_URL", "https://relay.example.com/"),
            ("SUNO_API_BASE_URL", "https://provider.example.com//"),
        ])
        .unwrap();
        assert_eq!(config.public_base_url(), "https://relay.example.com");
        assert_eq!(
            config.callback_url(),
            "https://relay.example.com/api/suno-callback"
        );
        assert_eq!(config.suno_api_base_url(), "https://provider.example.com");
    }

    #[test]
    fn missing_api_key_fails_validation() {
        let config = config_with(&[]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SUNO_API_KEY"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = config_with(&[("SUNO_API_KEY", "key"), ("BACKEND_PORT", "eighty")]);
        assert!(result.is_err());
    }

    #[test]
    fn unparsable_durations_are_rejected() {
        let err = config_with(&[("SUNO_API_KEY", "key"), ("PROVIDER_TIMEOUT_SECS", "30s")])
            .unwrap_err();
        assert!(err.to_string().contains("PROVIDER_TIMEOUT_SECS"));

        let err = config_with(&[("SUNO_API_KEY", "key"), ("CALLBACK_RETENTION_SECS", "-1")])
            .unwrap_err();
        assert!(err.to_string().contains("CALLBACK_RETENTION_SECS"));

        let config = config_with(&[
            ("SUNO_API_KEY", "key"),
            ("PROVIDER_TIMEOUT_SECS", "5"),
            ("CALLBACK_RETENTION_SECS", "3600"),
        ])
        .unwrap();
        assert_eq!(config.provider_timeout_secs(), 5);
        assert_eq!(config.callback_retention_secs(), 3600);
    }

    #[test]
    fn loopback_public_url_is_fatal_only_in_production() {
        let dev = config_with(&[("SUNO_API_KEY", "key")]).unwrap();
        assert!(dev.public_base_url_is_loopback());
        assert!(dev.validate().is_ok());

        let prod = config_with(&[
            ("SUNO_API_KEY", "key"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ])
        .unwrap();
        assert!(prod.is_production());
        assert!(prod.validate().is_err());

        let prod_public = config_with(&[
            ("SUNO_API_KEY", "key"),
            ("APP_ENV", "prod"),
            ("CORS_ORIGINS", "https://app.example.com"),
            ("PUBLIC_BASE_URL", "https://relay.example.com"),
        ])
        .unwrap();
        assert!(!prod_public.public_base_url_is_loopback());
        assert!(prod_public.validate().is_ok());
    }

    #[test]
    fn zero_upload_ceiling_is_rejected() {
        let config = config_with(&[("SUNO_API_KEY", "key"), ("MAX_FILE_SIZE_MB", "0")]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn url_host_handles_ports_and_ipv6() {
        assert_eq!(url_host("http://localhost:8000"), Some("localhost"));
        assert_eq!(url_host("https://relay.example.com/path"), Some("relay.example.com"));
        assert_eq!(url_host("http://[::1]:8000"), Some("[::1]"));
        assert_eq!(url_host("not a url"), None);
    }

    #[test]
    fn mask_secret_keeps_prefix() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcdefgh****");
        assert_eq!(mask_secret("short"), "short");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn debug_output_masks_api_key() {
        let config = config_with(&[("SUNO_API_KEY", "supersecretvalue")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("supersecretvalue"));
        assert!(debug.contains("supersec"));
    }
}
