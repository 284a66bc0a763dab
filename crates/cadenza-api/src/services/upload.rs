//! Upload relay: stream the cover source to storage, publish it, then submit
//! the generation request to the provider.

use std::sync::Arc;

use axum::extract::Multipart;
use cadenza_core::{AppError, Config, GenerationParams};
use cadenza_provider::{CoverGenerationRequest, GenerationProvider, ProviderError};
use cadenza_storage::{StagedUpload, Storage};

use crate::error::multipart_error;
use crate::utils::upload::{
    file_extension, parse_bool_flag, parse_weight, validate_audio_content_type,
};

/// A fully received upload form. The file is still staged and is discarded on drop.
#[derive(Debug)]
pub struct CoverUploadForm {
    pub staged: StagedUpload,
    pub original_filename: Option<String>,
    pub content_type: String,
    pub params: GenerationParams,
}

pub struct UploadRelayService {
    config: Config,
    storage: Arc<dyn Storage>,
    provider: Arc<dyn GenerationProvider>,
}

impl UploadRelayService {
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            config,
            storage,
            provider,
        }
    }

    /// Read the multipart form in whatever order the fields arrive.
    ///
    /// The file is written chunk by chunk and rejected as soon as it crosses
    /// the size ceiling. Text fields are validated after the whole form is read.
    pub async fn receive_form(&self, mut multipart: Multipart) -> Result<CoverUploadForm, AppError> {
        let max_bytes = self.config.max_file_size_bytes();

        let mut staged: Option<(StagedUpload, Option<String>, String)> = None;
        let mut prompt: Option<String> = None;
        let mut weirdness: Option<String> = None;
        let mut style_weight: Option<String> = None;
        let mut audio_weight: Option<String> = None;
        let mut model: Option<String> = None;
        let mut instrumental: Option<String> = None;

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_bytes))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "file" {
                if staged.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }

                let content_type = field.content_type().unwrap_or_default().to_string();
                validate_audio_content_type(&content_type)?;
                let filename = field.file_name().map(str::to_string);

                let mut upload = self.storage.stage(max_bytes).await?;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?
                {
                    upload.write_chunk(&chunk).await?;
                }

                tracing::debug!(
                    filename = ?filename,
                    content_type = %content_type,
                    size_bytes = upload.bytes_written(),
                    "Upload staged"
                );
                staged = Some((upload, filename, content_type));
                continue;
            }

            let slot = match name.as_str() {
                "prompt" => &mut prompt,
                "weirdnessConstraint" => &mut weirdness,
                "styleWeight" => &mut style_weight,
                "audioWeight" => &mut audio_weight,
                "model" => &mut model,
                "instrumental" => &mut instrumental,
                _ => continue,
            };
            let value = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
            *slot = Some(value);
        }

        let (staged, original_filename, content_type) =
            staged.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

        let prompt = prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("Field 'prompt' is required".to_string()))?;

        let defaults = GenerationParams::new(prompt);
        let params = GenerationParams {
            weirdness_constraint: parse_weight(
                "weirdnessConstraint",
                weirdness.as_deref(),
                defaults.weirdness_constraint,
            )?,
            style_weight: parse_weight("styleWeight", style_weight.as_deref(), defaults.style_weight)?,
            audio_weight: parse_weight("audioWeight", audio_weight.as_deref(), defaults.audio_weight)?,
            model: model
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| defaults.model.clone()),
            instrumental: parse_bool_flag(
                "instrumental",
                instrumental.as_deref(),
                defaults.instrumental,
            )?,
            ..defaults
        };

        Ok(CoverUploadForm {
            staged,
            original_filename,
            content_type,
            params,
        })
    }

    /// Publish the staged file and submit the cover generation. Returns the provider task id.
    pub async fn relay(&self, form: CoverUploadForm) -> Result<String, AppError> {
        let extension = form.original_filename.as_deref().and_then(file_extension);
        let stored = self.storage.commit(form.staged, extension).await?;

        let request = CoverGenerationRequest::build(
            &form.params,
            stored.url.clone(),
            self.config.callback_url(),
        );

        match self.provider.submit_cover(&request).await {
            Ok(task_id) => {
                tracing::info!(
                    task_id = %task_id,
                    key = %stored.key,
                    size_bytes = stored.size_bytes,
                    "Cover generation submitted"
                );
                Ok(task_id)
            }
            Err(err) => {
                // The provider will never fetch a file it rejected outright.
                if matches!(
                    err,
                    ProviderError::Transport { .. } | ProviderError::Application { .. }
                ) {
                    if let Err(e) = self.storage.delete(&stored.key).await {
                        tracing::warn!(key = %stored.key, error = %e, "Failed to remove rejected upload");
                    }
                }
                Err(err.into())
            }
        }
    }
}
