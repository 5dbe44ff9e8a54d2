//! Tape-based autograd engine
//!
//! Reverse-mode differentiation over `f64` vectors. A forward pass records
//! every differentiable operation on a [`Tape`]; [`Tape::backward`] replays
//! the records once, in reverse, propagating gradients through exactly the
//! arithmetic the forward pass performed. Control-flow decisions made on raw
//! values (step acceptance, error norms) are invisible to the tape.

pub mod ops;
mod tape;
mod tensor;

pub use tape::{BackwardOp, Tape};
pub use tensor::Tensor;
