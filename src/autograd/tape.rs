//! Gradient tape: an arena of backward records replayed in reverse

use super::Tensor;
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Backward rule of one recorded operation.
///
/// Implementations read their result's gradient cell and accumulate into
/// their inputs' cells. They must tolerate an empty result gradient (the
/// operation was recorded but its output never contributed to the loss,
/// e.g. the stages of a rejected integration step).
pub trait BackwardOp {
    /// Propagate the result gradient to the operation's inputs.
    fn backward(&self);
}

/// Append-only record of the differentiable operations of one forward pass.
///
/// Construction order is topological, so a single sweep in reverse index
/// order visits every record after all of its dependents and runs each
/// record exactly once. This stays correct when a tensor fans out into
/// several consumers, where recursing from the loss would re-enter shared
/// subgraphs and double-count.
///
/// A tape covers one forward/backward cycle; drop it afterwards to free the
/// records.
#[derive(Default)]
pub struct Tape {
    records: RefCell<Vec<Rc<dyn BackwardOp>>>,
}

impl Tape {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backward record.
    pub fn record(&self, op: Rc<dyn BackwardOp>) {
        self.records.borrow_mut().push(op);
    }

    /// Number of recorded operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Seed `output` with a gradient of ones and run the reverse sweep.
    pub fn backward(&self, output: &Tensor) {
        self.backward_seeded(output, Array1::ones(output.len()));
    }

    /// Seed `output` with `seed` and run the reverse sweep.
    ///
    /// Gradients accumulate into every tensor reachable from `output` that
    /// requires them. Run at most once per tape; a second sweep would add
    /// the same contributions again.
    pub fn backward_seeded(&self, output: &Tensor, seed: Array1<f64>) {
        output.accumulate_grad(seed);
        let records = self.records.borrow().clone();
        for op in records.iter().rev() {
            op.backward();
        }
    }
}
