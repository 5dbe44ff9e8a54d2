//! Loss functions

use crate::autograd::{BackwardOp, Tape, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Trait for loss functions.
pub trait LossFn {
    /// Compute the scalar loss and record its backward rule on the tape.
    fn forward(&self, tape: &Tape, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function.
    fn name(&self) -> &'static str;
}

/// Mean squared error, `L = mean((predictions − targets)²)`.
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, tape: &Tape, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "predictions and targets must have same length"
        );

        let diff = predictions.data() - targets.data();
        let n = predictions.len() as f64;
        let mse = diff.iter().map(|d| d * d).sum::<f64>() / n;

        let loss = Tensor::from_vec(vec![mse], predictions.requires_grad());

        if predictions.requires_grad() {
            // d(MSE)/d(pred) = 2·(pred − target)/n, scaled by the incoming
            // gradient of the scalar loss.
            tape.record(Rc::new(MseBackward {
                pred_grad_cell: predictions.grad_cell(),
                grad: &diff * (2.0 / n),
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}

struct MseBackward {
    pred_grad_cell: Rc<RefCell<Option<Array1<f64>>>>,
    grad: Array1<f64>,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for MseBackward {
    fn backward(&self) {
        if let Some(g) = self.result_grad.borrow().as_ref() {
            let scaled = &self.grad * g[0];
            let mut slot = self.pred_grad_cell.borrow_mut();
            match slot.as_mut() {
                Some(existing) => *existing += &scaled,
                None => *slot = Some(scaled),
            }
        }
    }
}
