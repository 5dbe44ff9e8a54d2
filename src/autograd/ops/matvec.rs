//! Matrix-vector product for the feed-forward vector field

use crate::autograd::{BackwardOp, Tape, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Matrix-vector product `y = W·x`.
///
/// `w` is a row-major `rows × cols` matrix flattened to length `rows * cols`;
/// `x` has length `cols`; the result has length `rows`.
pub fn matvec(tape: &Tape, w: &Tensor, x: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(w.len(), rows * cols, "matvec: weight size mismatch");
    assert_eq!(x.len(), cols, "matvec: input size mismatch");

    let w_data = w.data();
    let x_data = x.data();
    let mut out = Array1::zeros(rows);
    for i in 0..rows {
        let mut acc = 0.0;
        for j in 0..cols {
            acc += w_data[i * cols + j] * x_data[j];
        }
        out[i] = acc;
    }

    let requires_grad = w.requires_grad() || x.requires_grad();
    let result = Tensor::new(out, requires_grad);

    if requires_grad {
        tape.record(Rc::new(MatvecBackward {
            w: w.clone(),
            x: x.clone(),
            rows,
            cols,
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct MatvecBackward {
    w: Tensor,
    x: Tensor,
    rows: usize,
    cols: usize,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for MatvecBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.w.requires_grad() {
                // ∂L/∂W[i,j] = g[i] * x[j]
                let x_data = self.x.data();
                let mut grad_w = Array1::zeros(self.rows * self.cols);
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        grad_w[i * self.cols + j] = grad[i] * x_data[j];
                    }
                }
                self.w.accumulate_grad(grad_w);
            }

            if self.x.requires_grad() {
                // ∂L/∂x[j] = Σᵢ W[i,j] * g[i]
                let w_data = self.w.data();
                let mut grad_x = Array1::zeros(self.cols);
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        grad_x[j] += w_data[i * self.cols + j] * grad[i];
                    }
                }
                self.x.accumulate_grad(grad_x);
            }
        }
    }
}
