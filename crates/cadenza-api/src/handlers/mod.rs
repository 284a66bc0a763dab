pub mod callback;
pub mod cover_upload;
pub mod generation;
