//! Training error types

use crate::ode::SolveError;
use thiserror::Error;

/// Failure modes of dataset validation, batching, and training.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("batch sampler needs at least {batch_size} samples (dataset has {available})")]
    EmptyBatch { batch_size: usize, available: usize },

    #[error("dataset shapes disagree: {0}")]
    ShapeMismatch(String),

    #[error("invalid curriculum stage {index}: {reason}")]
    InvalidStage { index: usize, reason: String },

    #[error(transparent)]
    Solve(#[from] SolveError),
}
