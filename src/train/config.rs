//! Training configuration

use crate::ode::SolveOptions;
use serde::{Deserialize, Serialize};

/// Knobs of a training run. Everything has a default; the reference
/// configuration matches the oscillator experiment this crate ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Number of synthesized trajectories.
    pub dataset_size: usize,
    /// Samples per optimization step.
    pub batch_size: usize,
    /// Hidden width of the learned vector field.
    pub width: usize,
    /// Hidden depth of the learned vector field.
    pub depth: usize,
    /// Seed for dataset synthesis, parameter init, and batch shuffling.
    pub seed: u64,
    /// Print the loss every this many steps; 0 silences the trainer.
    pub log_every: usize,
    /// Optional global-norm gradient clip.
    pub grad_clip: Option<f64>,
    /// Integrator settings for the model's forward passes.
    pub solve: SolveOptions,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset_size: 256,
            batch_size: 32,
            width: 64,
            depth: 2,
            seed: 5678,
            log_every: 100,
            grad_clip: None,
            solve: SolveOptions::default(),
        }
    }
}
