//! Ground-truth dataset synthesis

use crate::autograd::{Tape, Tensor};
use crate::field::{RationalOscillator, VectorField};
use crate::ode::{solve, SolveError, SolveOptions};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Redraw budget per sample before giving up on the random box.
const MAX_REDRAWS: usize = 32;

/// Dataset synthesis failures.
#[derive(Debug, Error)]
pub enum DataError {
    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("could not draw a well-conditioned initial state after {attempts} attempts")]
    DegenerateSamples { attempts: usize },
}

/// Synthesis settings: time horizon, grid density, and the sampling box for
/// initial states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthOptions {
    /// End of the integration horizon (the grid starts at zero).
    pub t1: f64,
    /// Number of grid points, endpoints included.
    pub points: usize,
    /// Lower corner of the initial-state box, per component.
    pub y0_lo: f64,
    /// Upper corner of the initial-state box, per component.
    pub y0_hi: f64,
    /// Integrator settings for the ground-truth solves.
    pub solve: SolveOptions,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self { t1: 10.0, points: 100, y0_lo: -0.6, y0_hi: 1.0, solve: SolveOptions::default() }
    }
}

/// Ground-truth trajectories on a shared time grid.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Strictly increasing time grid, `ts[0] = 0`.
    pub ts: Vec<f64>,
    /// One `(ts.len(), data_size)` array per sample.
    pub ys: Vec<Array2<f64>>,
}

impl Dataset {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ys.len()
    }

    /// Whether the dataset holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ys.is_empty()
    }

    /// State dimension of the samples.
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.ys.first().map_or(0, |y| y.ncols())
    }
}

/// Synthesize `n_samples` ground-truth trajectories of the fixed oscillator,
/// one independent integration per sample.
///
/// Initial states are drawn uniformly from the configured box with the
/// explicitly threaded `rng`. A draw whose trajectory degenerates (solver
/// failure or non-finite values, e.g. too close to the field's singularity)
/// is discarded and redrawn, bounded by a retry budget; persistent failures
/// surface the underlying error instead of producing malformed data.
pub fn synthesize(
    n_samples: usize,
    opts: &SynthOptions,
    rng: &mut StdRng,
) -> Result<Dataset, DataError> {
    let field = RationalOscillator;
    let ts = Array1::linspace(0.0, opts.t1, opts.points).to_vec();

    let mut ys = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        ys.push(draw_sample(&field, &ts, opts, rng)?);
    }

    Ok(Dataset { ts, ys })
}

fn draw_sample(
    field: &RationalOscillator,
    ts: &[f64],
    opts: &SynthOptions,
    rng: &mut StdRng,
) -> Result<Array2<f64>, DataError> {
    let mut last_err = None;

    for _ in 0..MAX_REDRAWS {
        let y0 = Tensor::from_vec(
            (0..field.dim()).map(|_| rng.random_range(opts.y0_lo..opts.y0_hi)).collect(),
            false,
        );

        let tape = Tape::new();
        match solve(&tape, field, &y0, 0.0, opts.t1, ts, &opts.solve) {
            Ok(traj) => {
                let arr = traj.to_array();
                if arr.iter().all(|v| v.is_finite()) {
                    return Ok(arr);
                }
            }
            Err(e) => last_err = Some(e),
        }
    }

    match last_err {
        Some(e) => Err(DataError::Solve(e)),
        None => Err(DataError::DegenerateSamples { attempts: MAX_REDRAWS }),
    }
}
