//! Curriculum schedule: staged training over growing trajectory lengths

use super::TrainError;
use serde::{Deserialize, Serialize};

/// One stage of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    /// Learning rate for the stage.
    pub lr: f64,
    /// Number of optimization steps.
    pub steps: usize,
    /// Fraction of the trajectory horizon to fit, in `(0, 1]`.
    pub length_fraction: f64,
}

impl Stage {
    /// Grid points this stage uses from a grid of `grid_len` points.
    ///
    /// Truncates toward zero like the fraction it came from, but never below
    /// two points (an integration needs a span).
    #[must_use]
    pub fn points(&self, grid_len: usize) -> usize {
        ((grid_len as f64 * self.length_fraction) as usize).clamp(2, grid_len)
    }
}

/// Ordered sequence of stages, consumed front to back and never re-ordered.
///
/// Fitting short horizons first keeps early training away from the poor
/// local minima that full-length trajectories of a freshly initialized
/// field fall into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curriculum {
    stages: Vec<Stage>,
}

impl Curriculum {
    /// Validate and build a schedule.
    pub fn new(stages: Vec<Stage>) -> Result<Self, TrainError> {
        for (index, stage) in stages.iter().enumerate() {
            let reason = if !(stage.lr.is_finite() && stage.lr > 0.0) {
                Some(format!("learning rate must be positive (got {})", stage.lr))
            } else if stage.steps == 0 {
                Some("step count must be positive".to_string())
            } else if !(stage.length_fraction > 0.0 && stage.length_fraction <= 1.0) {
                Some(format!(
                    "length fraction must lie in (0, 1] (got {})",
                    stage.length_fraction
                ))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(TrainError::InvalidStage { index, reason });
            }
        }
        Ok(Self { stages })
    }

    /// The reference two-stage schedule: 500 steps on the first 10% of the
    /// horizon, then 500 steps on the whole of it, both at lr 3e-3.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            stages: vec![
                Stage { lr: 3e-3, steps: 500, length_fraction: 0.1 },
                Stage { lr: 3e-3, steps: 500, length_fraction: 1.0 },
            ],
        }
    }

    /// The stages, in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}
