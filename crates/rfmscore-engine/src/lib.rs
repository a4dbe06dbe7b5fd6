pub mod commands;
pub mod contracts;
pub mod date;
pub mod error;
pub mod ingest;
pub mod rfm;
pub mod segments;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{EngineError, EngineResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
