//! Activation autograd operations: softplus, tanh

use crate::autograd::{BackwardOp, Tape, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Numerically stable softplus scalar: `ln(1 + eˣ)`.
fn softplus_scalar(x: f64) -> f64 {
    if x > 30.0 {
        x
    } else if x < -30.0 {
        x.exp()
    } else {
        x.exp().ln_1p()
    }
}

fn sigmoid_scalar(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Softplus activation.
pub fn softplus(tape: &Tape, a: &Tensor) -> Tensor {
    let data = a.data().mapv(softplus_scalar);
    let requires_grad = a.requires_grad();

    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        tape.record(Rc::new(SoftplusBackward {
            a: a.clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct SoftplusBackward {
    a: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for SoftplusBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂softplus/∂x = σ(x)
                let grad_a = grad * &self.a.data().mapv(sigmoid_scalar);
                self.a.accumulate_grad(grad_a);
            }
        }
    }
}

/// Hyperbolic tangent activation.
pub fn tanh(tape: &Tape, a: &Tensor) -> Tensor {
    let data = a.data().mapv(f64::tanh);
    let requires_grad = a.requires_grad();

    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        tape.record(Rc::new(TanhBackward {
            output: result.clone(),
            a: a.clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct TanhBackward {
    a: Tensor,
    output: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for TanhBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂tanh/∂x = 1 - tanh²(x)
                let grad_a = grad * &self.output.data().mapv(|y| 1.0 - y * y);
                self.a.accumulate_grad(grad_a);
            }
        }
    }
}
