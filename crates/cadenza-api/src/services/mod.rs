pub mod callback_ingest;
pub mod callback_store;
pub mod reconciler;
pub mod upload;

pub use callback_ingest::{ingest_callback, parse_callback};
pub use callback_store::{spawn_retention_task, CallbackStore};
pub use reconciler::StatusReconciler;
pub use upload::{CoverUploadForm, UploadRelayService};
