//! Tensor type: owned data plus a gradient slot shared across clones

use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// A 1-D tensor of `f64` values with an optional gradient accumulator.
///
/// Cloning copies the data but shares the gradient cell: a parameter handle
/// held by a model and every clone captured by backward records accumulate
/// into the same slot. Data mutation (the optimizer's job) therefore only
/// affects the tensor it is performed on, while gradients written anywhere
/// are visible everywhere.
#[derive(Debug, Clone)]
pub struct Tensor {
    data: Array1<f64>,
    grad: Rc<RefCell<Option<Array1<f64>>>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a tensor from an ndarray.
    pub fn new(data: Array1<f64>, requires_grad: bool) -> Self {
        Self { data, grad: Rc::new(RefCell::new(None)), requires_grad }
    }

    /// Create a tensor from a `Vec`.
    pub fn from_vec(data: Vec<f64>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor.
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the underlying data.
    pub fn data(&self) -> &Array1<f64> {
        &self.data
    }

    /// Mutably borrow the underlying data.
    pub fn data_mut(&mut self) -> &mut Array1<f64> {
        &mut self.data
    }

    /// Whether gradients flow through this tensor.
    #[must_use]
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Current gradient, if one has been accumulated.
    pub fn grad(&self) -> Option<Array1<f64>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient slot.
    pub fn set_grad(&self, grad: Array1<f64>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add `grad` into the gradient slot, initializing it if empty.
    pub fn accumulate_grad(&self, grad: Array1<f64>) {
        let mut slot = self.grad.borrow_mut();
        match slot.as_mut() {
            Some(existing) => *existing += &grad,
            None => *slot = Some(grad),
        }
    }

    /// Clear the gradient slot.
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Handle to the shared gradient cell, for backward records.
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f64>>>> {
        Rc::clone(&self.grad)
    }

    /// Copy of the data as a tensor that does not require gradients.
    #[must_use]
    pub fn detach(&self) -> Tensor {
        Tensor::new(self.data.clone(), false)
    }
}
