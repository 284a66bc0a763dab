//! Cadenza Provider Library
//!
//! Typed client for the external music-generation API. Every call goes through
//! [`ProviderResponse`], which only yields data when both the HTTP status and
//! the envelope's application `code` are 200.

pub mod client;
pub mod error;
pub mod models;

pub use client::{GenerationProvider, SunoClient};
pub use error::{ProviderError, ProviderResult};
pub use models::{CoverGenerationRequest, Envelope, ProviderResponse};
