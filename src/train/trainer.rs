//! Curriculum trainer for the learned vector field

use super::{BatchSampler, Curriculum, LossFn, MSELoss, TrainConfig, TrainError};
use crate::autograd::{ops, Tape, Tensor};
use crate::data::Dataset;
use crate::field::{MlpField, VectorField};
use crate::ode::{solve, SolveError};
use crate::optim::{clip_grad_norm, Optimizer};
use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-stage record of a training run.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Learning rate the stage ran at.
    pub lr: f64,
    /// Grid points of the truncated horizon.
    pub grid_points: usize,
    /// Loss of every step, in order. Each entry is the mean over one batch;
    /// no running average is kept.
    pub losses: Vec<f64>,
}

/// Outcome of a full curriculum run.
#[derive(Debug, Clone)]
pub struct TrainResult {
    /// One report per curriculum stage, in execution order.
    pub stages: Vec<StageReport>,
}

impl TrainResult {
    /// Loss of the very first training step.
    #[must_use]
    pub fn first_loss(&self) -> Option<f64> {
        self.stages.first().and_then(|s| s.losses.first()).copied()
    }

    /// Loss of the very last training step.
    #[must_use]
    pub fn final_loss(&self) -> Option<f64> {
        self.stages.last().and_then(|s| s.losses.last()).copied()
    }
}

/// Fits an [`MlpField`] to a trajectory dataset by differentiating through
/// the integrator.
///
/// The trainer owns the field and mutates its parameters exclusively between
/// batches; every forward integration within a batch reads one consistent
/// parameter version.
pub struct Trainer {
    field: MlpField,
    optimizer: Box<dyn Optimizer>,
    config: TrainConfig,
}

impl Trainer {
    /// Create a trainer around a field and an optimizer.
    pub fn new(field: MlpField, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Self {
        Self { field, optimizer, config }
    }

    /// The field being trained.
    pub fn field(&self) -> &MlpField {
        &self.field
    }

    /// Consume the trainer, yielding the trained field.
    #[must_use]
    pub fn into_field(self) -> MlpField {
        self.field
    }

    /// The active configuration.
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Run the full curriculum against `dataset`.
    ///
    /// Each stage re-initializes the optimizer state, sets the stage
    /// learning rate, truncates the horizon to the stage's length fraction,
    /// and runs its fixed number of steps; there is no convergence check.
    /// Any integration failure aborts the run.
    pub fn train(
        &mut self,
        dataset: &Dataset,
        curriculum: &Curriculum,
        rng: &mut StdRng,
    ) -> Result<TrainResult, TrainError> {
        self.validate(dataset)?;

        let mut stages = Vec::with_capacity(curriculum.stages().len());

        for (stage_idx, stage) in curriculum.stages().iter().enumerate() {
            self.optimizer.reset();
            self.optimizer.set_lr(stage.lr);

            let grid_points = stage.points(dataset.ts.len());
            let ts_stage = &dataset.ts[..grid_points];

            let mut sampler = BatchSampler::new(
                dataset.len(),
                self.config.batch_size,
                StdRng::seed_from_u64(rng.random()),
            )?;

            let mut losses = Vec::with_capacity(stage.steps);
            for step in 0..stage.steps {
                let indices = sampler.next_batch();
                let loss = self.train_step(ts_stage, dataset, &indices)?;

                if self.config.log_every > 0
                    && (step % self.config.log_every == 0 || step + 1 == stage.steps)
                {
                    println!("stage {stage_idx} step {step:>5} loss {loss:.6}");
                }
                losses.push(loss);
            }

            stages.push(StageReport { lr: stage.lr, grid_points, losses });
        }

        Ok(TrainResult { stages })
    }

    /// One optimization step over a batch of dataset indices.
    ///
    /// Every sample is integrated on its own tape from the target's initial
    /// state; gradients accumulate into the shared parameter slots with a
    /// `1/batch` seed so the update follows the batch-mean loss.
    fn train_step(
        &mut self,
        ts: &[f64],
        dataset: &Dataset,
        indices: &[usize],
    ) -> Result<f64, TrainError> {
        let inv_batch = 1.0 / indices.len() as f64;

        {
            let mut params = self.field.params_mut();
            self.optimizer.zero_grad(&mut params);
        }

        let t0 = ts[0];
        let t1 = ts[ts.len() - 1];

        let mut batch_loss = 0.0;
        for &idx in indices {
            let sample = &dataset.ys[idx];

            let tape = Tape::new();
            let y0 = Tensor::new(sample.row(0).to_owned(), false);
            let traj = solve(&tape, &self.field, &y0, t0, t1, ts, &self.config.solve)?;

            let parts: Vec<&Tensor> = traj.ys.iter().collect();
            let pred = ops::concat(&tape, &parts);
            let target = Tensor::new(
                Array1::from_iter(sample.slice(s![..ts.len(), ..]).iter().copied()),
                false,
            );

            let loss = MSELoss.forward(&tape, &pred, &target);
            batch_loss += loss.data()[0];

            let scaled = ops::scale(&tape, &loss, inv_batch);
            tape.backward(&scaled);
        }

        let mut params = self.field.params_mut();
        if let Some(max_norm) = self.config.grad_clip {
            clip_grad_norm(&mut params, max_norm);
        }
        self.optimizer.step(&mut params);

        Ok(batch_loss * inv_batch)
    }

    /// Integrate the current field over `ts` without recording gradients.
    pub fn predict(&self, ts: &[f64], y0: &Array1<f64>) -> Result<Array2<f64>, SolveError> {
        let tape = Tape::new();
        let y0 = Tensor::new(y0.clone(), false);
        let traj =
            solve(&tape, &self.field, &y0, ts[0], ts[ts.len() - 1], ts, &self.config.solve)?;
        Ok(traj.to_array())
    }

    /// Eager shape checks before any integration begins.
    fn validate(&self, dataset: &Dataset) -> Result<(), TrainError> {
        let dim = self.field.dim();
        let grid = dataset.ts.len();

        if grid < 2 {
            return Err(TrainError::ShapeMismatch(format!(
                "time grid needs at least 2 points (got {grid})"
            )));
        }
        for (i, y) in dataset.ys.iter().enumerate() {
            if y.nrows() != grid || y.ncols() != dim {
                return Err(TrainError::ShapeMismatch(format!(
                    "sample {i} has shape ({}, {}), expected ({grid}, {dim})",
                    y.nrows(),
                    y.ncols()
                )));
            }
        }
        Ok(())
    }
}
