//! Shared helpers for the cadenza command-line tools.

use std::path::Path;

use cadenza_core::{mask_secret, Config};
use cadenza_provider::ProviderError;
use serde::Serialize;

/// Numeric settings dropped (and so defaulted) when they fail to parse.
const NUMERIC_SETTINGS: &[&str] = &[
    "BACKEND_PORT",
    "MAX_FILE_SIZE_MB",
    "PROVIDER_TIMEOUT_SECS",
    "CALLBACK_RETENTION_SECS",
];

/// Settings the relay cannot run without, in report order.
pub const REQUIRED_SETTINGS: &[&str] = &["SUNO_API_KEY", "SUNO_API_BASE_URL", "PUBLIC_BASE_URL"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingStatus {
    pub name: &'static str,
    pub set: bool,
    /// Display value; secrets are masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Report which required settings are present. Blank values count as unset.
pub fn setting_report<F>(lookup: F) -> Vec<SettingStatus>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_SETTINGS
        .iter()
        .map(|&name| {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            SettingStatus {
                name,
                set: value.is_some(),
                value: value.map(|v| {
                    if name == "SUNO_API_KEY" {
                        mask_secret(&v)
                    } else {
                        v
                    }
                }),
            }
        })
        .collect()
}

pub fn settings_complete(report: &[SettingStatus]) -> bool {
    report.iter().all(|s| s.set)
}

/// Load configuration without giving up on the first bad value.
///
/// If parsing fails, the error is returned alongside a configuration built
/// with the numeric settings at their defaults, so the remaining checks still run.
pub fn load_config_lenient<F>(lookup: F) -> anyhow::Result<(Config, Option<String>)>
where
    F: Fn(&str) -> Option<String>,
{
    match Config::from_source(&lookup) {
        Ok(config) => Ok((config, None)),
        Err(e) => {
            let fallback = Config::from_source(|key| {
                if NUMERIC_SETTINGS.contains(&key) {
                    None
                } else {
                    lookup(key)
                }
            })?;
            Ok((fallback, Some(e.to_string())))
        }
    }
}

/// Local prerequisites the provider round trip depends on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalSetup {
    pub upload_dir: String,
    pub upload_dir_exists: bool,
    pub public_base_url: String,
    pub public_base_url_is_loopback: bool,
}

pub fn local_setup(config: &Config) -> LocalSetup {
    LocalSetup {
        upload_dir: config.upload_dir().to_string(),
        upload_dir_exists: Path::new(config.upload_dir()).is_dir(),
        public_base_url: config.public_base_url().to_string(),
        public_base_url_is_loopback: config.public_base_url_is_loopback(),
    }
}

/// Human-readable explanation of a failed connectivity check.
pub fn describe_failure(err: &ProviderError) -> String {
    match err {
        ProviderError::Transport { status: 401, .. } => {
            "Invalid API key (provider answered 401 Unauthorized)".to_string()
        }
        ProviderError::Transport { status, message } => {
            format!("Provider returned HTTP {}: {}", status, message)
        }
        ProviderError::Application { code, message } => match code {
            Some(code) => format!("Provider rejected the request (code {}): {}", code, message),
            None => format!("Provider rejected the request: {}", message),
        },
        ProviderError::Timeout(_) => "Provider did not respond before the timeout".to_string(),
        ProviderError::Network(detail) => format!("Could not reach provider: {}", detail),
        other => other.to_string(),
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn report_masks_api_key() {
        let report = setting_report(lookup_from(&[
            ("SUNO_API_KEY", "sk-abcdefghijklmnop"),
            ("SUNO_API_BASE_URL", "https://api.sunoapi.org"),
            ("PUBLIC_BASE_URL", "https://relay.example.com"),
        ]));

        assert!(settings_complete(&report));
        assert_eq!(report[0].value.as_deref(), Some("sk-abcde***********"));
        assert_eq!(report[2].value.as_deref(), Some("https://relay.example.com"));
    }

    #[test]
    fn blank_and_missing_are_unset() {
        let report = setting_report(lookup_from(&[("SUNO_API_KEY", "  ")]));

        assert!(!settings_complete(&report));
        assert!(report.iter().all(|s| !s.set && s.value.is_none()));
    }

    #[test]
    fn lenient_load_reports_bad_numbers_and_keeps_going() {
        let (config, error) = load_config_lenient(lookup_from(&[
            ("SUNO_API_KEY", "sk-abcdefgh"),
            ("BACKEND_PORT", "eighty"),
            ("PUBLIC_BASE_URL", "https://relay.example.com"),
        ]))
        .unwrap();

        assert!(error.unwrap().contains("BACKEND_PORT"));
        assert_eq!(config.server_port(), 8000);
        assert_eq!(config.public_base_url(), "https://relay.example.com");

        let (_, error) = load_config_lenient(lookup_from(&[("SUNO_API_KEY", "k")])).unwrap();
        assert!(error.is_none());
    }

    #[test]
    fn local_setup_flags_loopback_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().display().to_string();
        let (config, _) = load_config_lenient(lookup_from(&[
            ("UPLOAD_DIR", upload_dir.as_str()),
            ("PUBLIC_BASE_URL", "http://127.0.0.1:8000"),
        ]))
        .unwrap();

        let setup = local_setup(&config);
        assert!(setup.upload_dir_exists);
        assert!(setup.public_base_url_is_loopback);

        let missing = dir.path().join("not-created").display().to_string();
        let (config, _) = load_config_lenient(lookup_from(&[
            ("UPLOAD_DIR", missing.as_str()),
            ("PUBLIC_BASE_URL", "https://abc123.ngrok.io"),
        ]))
        .unwrap();

        let setup = local_setup(&config);
        assert!(!setup.upload_dir_exists);
        assert!(!setup.public_base_url_is_loopback);
    }

    #[test]
    fn unauthorized_is_reported_as_invalid_key() {
        let err = ProviderError::Transport {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(describe_failure(&err).starts_with("Invalid API key"));

        let err = ProviderError::Application {
            code: Some(429),
            message: "Insufficient credits".to_string(),
        };
        assert_eq!(
            describe_failure(&err),
            "Provider rejected the request (code 429): Insufficient credits"
        );
    }
}
