//! Vector fields: the right-hand side `dy/dt = f(t, y)` of an ODE system

mod mlp;
mod oscillator;

pub use mlp::MlpField;
pub use oscillator::RationalOscillator;

use crate::autograd::{Tape, Tensor};

/// Right-hand side of an ODE system.
///
/// Implementations must be pure: no mutation of the field's own state, and
/// any learnable parameters are read-only for the duration of an integration
/// call. Differentiable fields build their result through
/// [`ops`](crate::autograd::ops) so gradients can flow to `y` and to the
/// parameters; fields used only for data synthesis may skip the tape.
pub trait VectorField {
    /// State dimension.
    fn dim(&self) -> usize;

    /// Evaluate `dy/dt` at `(t, y)`.
    fn eval(&self, tape: &Tape, t: f64, y: &Tensor) -> Tensor;
}
