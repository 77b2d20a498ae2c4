pub mod types;
pub mod client;
pub mod selection;
pub mod prompt;
pub mod repair;
pub mod validation;
pub mod planner;
pub mod sanitize;
pub mod tracker;
pub mod writer;
pub mod assembler;


pub use types::*;
pub use client::*;
pub use selection::*;
pub use prompt::*;
pub use repair::*;
pub use validation::*;
pub use planner::*;
pub use sanitize::*;
pub use tracker::*;
pub use writer::*;
pub use assembler::*;

use thiserror::Error;

use crate::config::ModelRole;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Provider unreachable at {0}")]
    Connection(String),

    #[error("Provider request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("No model configured for the {0} role")]
    NoModelAvailable(ModelRole),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Plan does not match the required shape: {0}")]
    InvalidPlan(String),

    #[error("Sanitization failed: {0}")]
    Sanitization(String),
}

impl GenerationError {
    /// Transport or provider-side failure, as opposed to malformed model output.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::Timeout(_)
                | Self::Provider { .. }
                | Self::HttpClient(_)
                | Self::ResponseParsing(_)
        )
    }
}
