//! Common utilities for the upload form

use cadenza_core::AppError;

/// Normalize MIME type by stripping parameters (e.g. "audio/mpeg; charset=binary" -> "audio/mpeg").
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Accept any declared content type that names an audio type.
pub fn validate_audio_content_type(content_type: &str) -> Result<(), AppError> {
    if !normalize_mime_type(content_type).contains("audio") {
        return Err(AppError::InvalidInput(
            "File must be an audio file".to_string(),
        ));
    }
    Ok(())
}

/// Extension of the client-supplied filename, without the dot.
pub fn file_extension(filename: &str) -> Option<&str> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
}

/// Parse a numeric tuning field. Absent or blank uses the default; the value is
/// forwarded as-is without range checks.
pub fn parse_weight(name: &str, raw: Option<&str>, default: f64) -> Result<f64, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::InvalidInput(format!(
            "Field '{}' must be a number, got '{}'",
            name, raw
        ))),
    }
}

/// Parse a form boolean (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_bool_flag(name: &str, raw: Option<&str>, default: bool) -> Result<bool, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(AppError::InvalidInput(format!(
            "Field '{}' must be a boolean, got '{}'",
            name, raw
        ))),
    }
}
