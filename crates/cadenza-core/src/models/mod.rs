pub mod callback;
pub mod generation;

pub use callback::{CallbackAck, CallbackRecord, CallbackType};
pub use generation::{
    GenerationDetailsResponse, GenerationParams, GenerationStatus, GenerationStatusResponse,
    ServiceInfo, TaskResponse,
};
