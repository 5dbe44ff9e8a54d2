//! Differentiable adaptive-step ODE integration
//!
//! An explicit embedded Runge-Kutta solver — Tsitouras 5(4), seven stages,
//! first-same-as-last — driven by a PID step-size controller, with cubic
//! Hermite dense output at caller-requested save times. The accepted-step
//! arithmetic runs through the autograd tape, so trajectories are
//! differentiable with respect to the initial state and the vector field's
//! parameters; step-size decisions are made on raw values and contribute no
//! gradient.

mod controller;
mod error;
mod interpolate;
mod solver;
mod stepper;
mod tableau;

pub use controller::PidController;
pub use error::SolveError;
pub use solver::{solve, SolveOptions, SolveStats, Trajectory};
