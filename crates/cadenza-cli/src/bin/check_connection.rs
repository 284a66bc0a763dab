use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use cadenza_cli::{
    describe_failure, init_tracing, load_config_lenient, local_setup, setting_report,
    settings_complete, LocalSetup, SettingStatus,
};
use cadenza_core::Config;
use cadenza_provider::{GenerationProvider, SunoClient};

#[derive(Parser, Debug)]
#[command(name = "check_connection")]
#[command(about = "Verify relay configuration and provider connectivity")]
struct Args {
    /// Print a machine-readable JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    settings: Vec<SettingStatus>,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<ProviderCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_setup: Option<LocalSetup>,
}

#[derive(Serialize)]
struct ProviderCheck {
    base_url: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_credits: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    dotenvy::dotenv().ok();
    let lookup = |key: &str| std::env::var(key).ok();

    let (config, config_error) = load_config_lenient(lookup)?;
    let settings = setting_report(lookup);
    let complete = settings_complete(&settings);

    let mut report = Report {
        settings,
        complete,
        config_error,
        provider: None,
        local_setup: None,
    };

    if complete {
        report.provider = Some(check_provider(&config).await?);
        report.local_setup = Some(local_setup(&config));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let ok = report.complete
        && report.config_error.is_none()
        && report.provider.as_ref().is_some_and(|p| p.ok);
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn check_provider(config: &Config) -> Result<ProviderCheck> {
    let client = SunoClient::new(
        config.suno_api_base_url(),
        config.suno_api_key(),
        Duration::from_secs(config.provider_timeout_secs()),
    )?;
    tracing::debug!(base_url = client.base_url(), "Querying remaining credits");

    let result = match client.remaining_credits().await {
        Ok(credits) => ProviderCheck {
            base_url: client.base_url().to_string(),
            ok: true,
            remaining_credits: credits,
            error: None,
        },
        Err(e) => ProviderCheck {
            base_url: client.base_url().to_string(),
            ok: false,
            remaining_credits: None,
            error: Some(describe_failure(&e)),
        },
    };
    Ok(result)
}

fn print_report(report: &Report) {
    println!("Configuration");
    for setting in &report.settings {
        match &setting.value {
            Some(value) => println!("  {:<20} set      {}", setting.name, value),
            None => println!("  {:<20} NOT SET", setting.name),
        }
    }

    if let Some(error) = &report.config_error {
        println!();
        println!("  Configuration error: {}", error);
        println!("  Continuing with defaults for the unparsable values.");
    }

    if !report.complete {
        println!();
        println!("Configuration incomplete; set the missing variables (or add them to .env).");
        return;
    }

    println!();
    if let Some(check) = &report.provider {
        println!("Provider ({})", check.base_url);
        if check.ok {
            match check.remaining_credits {
                Some(credits) => println!("  Connected, {} credits remaining", credits),
                None => println!("  Connected"),
            }
        } else {
            println!("  FAILED: {}", check.error.as_deref().unwrap_or("unknown error"));
        }
    }

    if let Some(setup) = &report.local_setup {
        println!();
        println!("Local setup");
        if setup.upload_dir_exists {
            println!("  Upload directory exists: {}", setup.upload_dir);
        } else {
            println!("  Upload directory will be created: {}", setup.upload_dir);
        }
        if setup.public_base_url_is_loopback {
            println!("  WARNING: PUBLIC_BASE_URL is a loopback address: {}", setup.public_base_url);
            println!("  The provider cannot fetch uploads or deliver callbacks there.");
            println!("  Expose the server (e.g. `ngrok http 8000`) and set PUBLIC_BASE_URL to the public URL.");
        } else {
            println!("  PUBLIC_BASE_URL is publicly reachable: {}", setup.public_base_url);
        }
    }
}
