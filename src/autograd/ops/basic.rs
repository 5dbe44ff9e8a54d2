//! Basic autograd operations: add, scale, linear combination, concat

use crate::autograd::{BackwardOp, Tape, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Add two tensors elementwise.
pub fn add(tape: &Tape, a: &Tensor, b: &Tensor) -> Tensor {
    assert_eq!(a.len(), b.len(), "add: operand lengths differ");
    let data = a.data() + b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        tape.record(Rc::new(AddBackward {
            a: a.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct AddBackward {
    a: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad.clone());
            }
            if self.b.requires_grad() {
                self.b.accumulate_grad(grad.clone());
            }
        }
    }
}

/// Scale a tensor by a constant.
pub fn scale(tape: &Tape, a: &Tensor, factor: f64) -> Tensor {
    let data = a.data() * factor;
    let requires_grad = a.requires_grad();

    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        tape.record(Rc::new(ScaleBackward {
            a: a.clone(),
            factor,
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct ScaleBackward {
    a: Tensor,
    factor: f64,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                self.a.accumulate_grad(grad * self.factor);
            }
        }
    }
}

/// Linear combination `Σ cᵢ·xᵢ` of equally sized tensors.
///
/// One record covers the whole sum, which keeps Runge-Kutta stage updates
/// and interpolation to a single tape entry each instead of a chain of
/// add/scale pairs.
pub fn linear_combination(tape: &Tape, terms: &[(f64, &Tensor)]) -> Tensor {
    assert!(!terms.is_empty(), "linear_combination: no terms");
    let n = terms[0].1.len();

    let mut data = Array1::zeros(n);
    for (c, x) in terms {
        assert_eq!(x.len(), n, "linear_combination: operand lengths differ");
        data.scaled_add(*c, x.data());
    }

    let requires_grad = terms.iter().any(|(_, x)| x.requires_grad());
    let result = Tensor::new(data, requires_grad);

    if requires_grad {
        tape.record(Rc::new(LinearCombinationBackward {
            terms: terms.iter().map(|(c, x)| (*c, (*x).clone())).collect(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct LinearCombinationBackward {
    terms: Vec<(f64, Tensor)>,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for LinearCombinationBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            for (c, x) in &self.terms {
                if x.requires_grad() {
                    x.accumulate_grad(grad * *c);
                }
            }
        }
    }
}

/// Concatenate tensors into one.
pub fn concat(tape: &Tape, parts: &[&Tensor]) -> Tensor {
    assert!(!parts.is_empty(), "concat: no parts");

    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut data = Vec::with_capacity(total);
    for part in parts {
        data.extend(part.data().iter().copied());
    }

    let requires_grad = parts.iter().any(|p| p.requires_grad());
    let result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        tape.record(Rc::new(ConcatBackward {
            parts: parts.iter().map(|p| (*p).clone()).collect(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct ConcatBackward {
    parts: Vec<Tensor>,
    result_grad: Rc<RefCell<Option<Array1<f64>>>>,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let mut offset = 0;
            for part in &self.parts {
                let len = part.len();
                if part.requires_grad() {
                    let slice = grad.slice(ndarray::s![offset..offset + len]);
                    part.accumulate_grad(slice.to_owned());
                }
                offset += len;
            }
        }
    }
}
