//! Model selection strategies.
//!
//! Every call picks one model id from the role's candidate list. The default
//! spreads load uniformly across equivalent variants; tests substitute the
//! deterministic strategy.

use rand::seq::SliceRandom;

use super::GenerationError;
use crate::config::ModelRole;

pub trait ModelSelector {
    fn select<'a>(&self, candidates: &'a [String]) -> Option<&'a str>;
}

/// Uniformly random choice.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRandomSelector;

impl ModelSelector for UniformRandomSelector {
    fn select<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

/// Always the first candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstCandidateSelector;

impl ModelSelector for FirstCandidateSelector {
    fn select<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates.first().map(String::as_str)
    }
}

/// Select for a role, mapping an empty candidate list to an error.
pub fn select_model<'a>(
    selector: &dyn ModelSelector,
    candidates: &'a [String],
    role: ModelRole,
) -> Result<&'a str, GenerationError> {
    selector
        .select(candidates)
        .ok_or(GenerationError::NoModelAvailable(role))
}
