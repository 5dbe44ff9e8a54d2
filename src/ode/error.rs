//! Integration error types

use super::solver::Trajectory;
use thiserror::Error;

/// Failure modes of an integration call.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("step size underflow at t = {t:.6e} (proposed dt = {dt:.6e})")]
    StepSizeUnderflow { t: f64, dt: f64 },

    #[error("step budget of {max_steps} exhausted at t = {t:.6e} before reaching t1")]
    StepBudgetExceeded {
        max_steps: usize,
        t: f64,
        /// Save points reached before the budget ran out; the caller decides
        /// whether a prefix is acceptable.
        partial: Box<Trajectory>,
    },

    #[error("integration span must satisfy t1 > t0 (got t0 = {t0}, t1 = {t1})")]
    InvalidSpan { t0: f64, t1: f64 },

    #[error("initial step size must be positive and finite (got {0})")]
    InvalidDt0(f64),

    #[error("save times must be strictly increasing and lie within [t0, t1]")]
    InvalidSaveTimes,

    #[error("state dimension {got} does not match vector field dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}
