//! Cadenza Storage Library
//!
//! This crate provides the storage abstraction used by the upload relay and its
//! local filesystem implementation.
//!
//! # Upload lifecycle
//!
//! Uploads are written in two phases. [`Storage::stage`] opens a scoped temp
//! file inside the storage directory and enforces the size ceiling on every
//! chunk. [`Storage::commit`] renames it to a permanent `{uuid}{.ext}` key. A
//! [`StagedUpload`] dropped without being committed removes its temp file.
//!
//! Keys are flat filenames and must not contain `..`, `/` or `\`.

pub mod local;
pub mod traits;

// Re-export commonly used types
pub use local::LocalStorage;
pub use traits::{StagedUpload, Storage, StorageError, StorageResult, StoredObject};
