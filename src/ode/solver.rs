//! Adaptive integration loop with dense save-time output

use super::controller::{ControllerState, PidController};
use super::error::SolveError;
use super::interpolate::hermite;
use super::stepper::rk_step;
use crate::autograd::{Tape, Tensor};
use crate::field::VectorField;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Integration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Initial step size; `None` picks a conservative fraction of the span.
    pub dt0: Option<f64>,
    /// Cap on accepted plus rejected step attempts.
    pub max_steps: usize,
    /// Tolerances and step-size control gains.
    pub controller: PidController,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { dt0: None, max_steps: 4096, controller: PidController::default() }
    }
}

/// Counters for one integration call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveStats {
    /// Accepted steps.
    pub accepted: usize,
    /// Rejected step attempts.
    pub rejected: usize,
    /// Vector field evaluations.
    pub rhs_evals: usize,
}

/// States recorded at the requested save times.
///
/// Entries are tape tensors: any of them can be differentiated with respect
/// to the initial state and the field parameters by running the tape
/// backward. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Trajectory {
    /// Save times actually produced (a prefix of the request on failure).
    pub ts: Vec<f64>,
    /// Interpolated state at each save time.
    pub ys: Vec<Tensor>,
    /// Step and evaluation counters.
    pub stats: SolveStats,
}

impl Trajectory {
    /// Number of saved states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ys.len()
    }

    /// Whether nothing was saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ys.is_empty()
    }

    /// Copy the saved states into a `(len, dim)` array.
    #[must_use]
    pub fn to_array(&self) -> Array2<f64> {
        let dim = self.ys.first().map_or(0, Tensor::len);
        let mut out = Array2::zeros((self.ys.len(), dim));
        for (i, y) in self.ys.iter().enumerate() {
            out.row_mut(i).assign(y.data());
        }
        out
    }
}

/// Smallest step size that still advances `t` meaningfully.
fn step_floor(t: f64) -> f64 {
    8.0 * f64::EPSILON * t.abs().max(1.0)
}

/// Integrate `field` from `(t0, y0)` to `t1`, recording the state at each of
/// `save_times` via dense-output interpolation.
///
/// Step sizes adapt freely; save times are filled in as accepted steps pass
/// over them (one advancing pointer over the sorted list), so the output
/// grid never distorts the step sequence. The final step is shrunk to land
/// on `t1` exactly.
///
/// All accepted-step arithmetic is recorded on `tape`; gradients of any
/// saved state with respect to `y0` and the field parameters follow from a
/// single backward sweep. The number and sizes of the steps taken are
/// constants of that gradient: accept/reject decisions are made on raw
/// values off the tape.
///
/// # Errors
///
/// [`SolveError::StepSizeUnderflow`] when the controller can no longer make
/// progress, [`SolveError::StepBudgetExceeded`] (carrying the prefix
/// trajectory) when `max_steps` attempts are spent, and validation errors
/// for malformed spans, save times, or dimensions.
pub fn solve<F: VectorField + ?Sized>(
    tape: &Tape,
    field: &F,
    y0: &Tensor,
    t0: f64,
    t1: f64,
    save_times: &[f64],
    opts: &SolveOptions,
) -> Result<Trajectory, SolveError> {
    if y0.len() != field.dim() {
        return Err(SolveError::DimensionMismatch { expected: field.dim(), got: y0.len() });
    }
    if !t0.is_finite() || !t1.is_finite() || t1 <= t0 {
        return Err(SolveError::InvalidSpan { t0, t1 });
    }
    if save_times.windows(2).any(|w| w[1] <= w[0])
        || save_times.iter().any(|&s| s < t0 || s > t1)
    {
        return Err(SolveError::InvalidSaveTimes);
    }

    let span = t1 - t0;
    let mut h = match opts.dt0 {
        Some(dt0) if dt0.is_finite() && dt0 > 0.0 => dt0.min(span),
        Some(dt0) => return Err(SolveError::InvalidDt0(dt0)),
        None => span * 1e-3,
    };

    let mut stats = SolveStats::default();
    let mut ts = Vec::with_capacity(save_times.len());
    let mut ys: Vec<Tensor> = Vec::with_capacity(save_times.len());

    let mut save_idx = 0;
    while save_idx < save_times.len() && save_times[save_idx] <= t0 {
        ts.push(save_times[save_idx]);
        ys.push(y0.clone());
        save_idx += 1;
    }

    let mut t = t0;
    let mut y = y0.clone();
    let mut k_first = field.eval(tape, t, &y);
    stats.rhs_evals += 1;

    let mut state = ControllerState::new();
    let mut attempts = 0;

    while t < t1 {
        if attempts == opts.max_steps {
            return Err(SolveError::StepBudgetExceeded {
                max_steps: opts.max_steps,
                t,
                partial: Box::new(Trajectory { ts, ys, stats }),
            });
        }
        attempts += 1;

        // shrink the last step to land on t1 exactly
        let last = h >= t1 - t;
        let h_attempt = if last { t1 - t } else { h };

        let step = rk_step(tape, field, t, &y, &k_first, h_attempt);
        stats.rhs_evals += 6;

        let r = opts.controller.error_ratio(&step.err, y.data(), step.y_new.data());
        let (h_next, accept) = opts.controller.propose(&mut state, h_attempt, r);

        if accept {
            let t_new = if last { t1 } else { t + h_attempt };

            while save_idx < save_times.len() && save_times[save_idx] <= t_new {
                let t_save = save_times[save_idx];
                let theta = (t_save - t) / h_attempt;
                let y_save = if theta >= 1.0 {
                    step.y_new.clone()
                } else {
                    hermite(tape, theta, h_attempt, &y, &step.y_new, &k_first, &step.k_last)
                };
                ts.push(t_save);
                ys.push(y_save);
                save_idx += 1;
            }

            y = step.y_new;
            k_first = step.k_last;
            t = t_new;
            stats.accepted += 1;
        } else {
            stats.rejected += 1;
        }

        if t >= t1 {
            break;
        }
        if h_next < step_floor(t) {
            return Err(SolveError::StepSizeUnderflow { t, dt: h_next });
        }
        h = h_next;
    }

    Ok(Trajectory { ts, ys, stats })
}
