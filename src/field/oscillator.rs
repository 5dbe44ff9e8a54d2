//! Fixed rational oscillator used to synthesize ground-truth trajectories

use super::VectorField;
use crate::autograd::{Tape, Tensor};
use ndarray::array;

/// Two-dimensional nonlinear oscillator with rational coupling:
///
/// ```text
/// dy₀/dt =  y₁ / (1 + y₁)
/// dy₁/dt = −y₀ / (1 + y₀)
/// ```
///
/// Singular along `yᵢ = −1`; trajectories started inside the sampling box
/// stay clear of the singularity. Used for data synthesis only — the field
/// carries no parameters and does not propagate gradients.
#[derive(Debug, Clone, Copy, Default)]
pub struct RationalOscillator;

impl VectorField for RationalOscillator {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, _tape: &Tape, _t: f64, y: &Tensor) -> Tensor {
        assert!(!y.requires_grad(), "RationalOscillator is not differentiable");
        let d = y.data();
        Tensor::new(array![d[1] / (1.0 + d[1]), -d[0] / (1.0 + d[0])], false)
    }
}
