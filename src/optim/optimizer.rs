//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms.
///
/// Parameters are borrowed from the model that owns them, so updates land
/// directly in the field the integrator reads on the next forward pass.
pub trait Optimizer {
    /// Apply one update to the parameters from their accumulated gradients.
    ///
    /// Parameters without a gradient are left untouched.
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Clear all accumulated gradients.
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Discard internal state (moment estimates, step counters) so the next
    /// `step` starts from scratch. Called at every curriculum stage boundary.
    fn reset(&mut self);

    /// Get learning rate.
    fn lr(&self) -> f64;

    /// Set learning rate.
    fn set_lr(&mut self, lr: f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    /// Minimal optimizer implementation for the default trait methods.
    struct TestOptimizer {
        learning_rate: f64,
    }

    impl Optimizer for TestOptimizer {
        fn step(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                if let Some(grad) = param.grad() {
                    let new_data = param.data() - &(&grad * self.learning_rate);
                    *param.data_mut() = new_data;
                }
            }
        }

        fn reset(&mut self) {}

        fn lr(&self) -> f64 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f64) {
            self.learning_rate = lr;
        }
    }

    #[test]
    fn test_step_applies_gradient() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut param = Tensor::from_vec(vec![1.0, 2.0], true);
        param.set_grad(arr1(&[0.5, 1.0]));

        opt.step(&mut [&mut param]);
        assert_eq!(param.data(), &arr1(&[0.95, 1.9]));
    }

    #[test]
    fn test_step_skips_missing_gradient() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut param = Tensor::from_vec(vec![1.0, 2.0], true);

        opt.step(&mut [&mut param]);
        assert_eq!(param.data(), &arr1(&[1.0, 2.0]));
    }

    #[test]
    fn test_zero_grad() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut param = Tensor::from_vec(vec![1.0], true);
        param.set_grad(arr1(&[0.5]));
        assert!(param.grad().is_some());

        opt.zero_grad(&mut [&mut param]);
        assert!(param.grad().is_none());
    }

    #[test]
    fn test_set_lr() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        opt.set_lr(0.01);
        assert_eq!(opt.lr(), 0.01);
    }
}
