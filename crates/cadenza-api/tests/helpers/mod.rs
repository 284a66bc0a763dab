//! Test helpers: build the application against a mock provider and a temp upload dir.
//!
//! Run from workspace root: `cargo test -p cadenza-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use cadenza_api::setup;
use cadenza_api::AppState;
use cadenza_core::Config;
use mockito::ServerGuard;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const PUBLIC_BASE_URL: &str = "https://relay.test";
pub const TEST_API_KEY: &str = "test-suno-key";
pub const UPLOAD_COVER: &str = "/api/v1/generate/upload-cover";
pub const RECORD_INFO: &str = "/api/v1/generate/record-info";

/// Test application: server, mock provider, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub provider: ServerGuard,
    pub state: Arc<AppState>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of the files currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        list_files(self.upload_dir.path())
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("upload dir readable")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Setup test app with a 1 MB upload ceiling.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let provider = mockito::Server::new_async().await;
    let upload_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut values: HashMap<String, String> = [
        ("SUNO_API_KEY", TEST_API_KEY.to_string()),
        ("SUNO_API_BASE_URL", provider.url()),
        ("PUBLIC_BASE_URL", PUBLIC_BASE_URL.to_string()),
        ("UPLOAD_DIR", upload_dir.path().display().to_string()),
        ("MAX_FILE_SIZE_MB", "1".to_string()),
        ("PROVIDER_TIMEOUT_SECS", "5".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    for (key, value) in overrides {
        values.insert(key.to_string(), value.to_string());
    }

    let config = Config::from_map(&values).expect("valid test config");
    let (state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        provider,
        state,
        upload_dir,
    }
}

/// Multipart form with an audio file and a prompt.
pub fn cover_form(file: Vec<u8>, prompt: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(file)
                .file_name("source.mp3")
                .mime_type("audio/mpeg"),
        )
        .add_text("prompt", prompt.to_string())
}

pub fn success_envelope(data: serde_json::Value) -> String {
    serde_json::json!({"code": 200, "msg": "success", "data": data}).to_string()
}

/// Base URL of a provider that accepts connections and never answers.
pub async fn silent_provider_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind silent provider");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}
