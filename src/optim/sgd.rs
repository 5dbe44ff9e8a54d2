//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// SGD with optional momentum.
pub struct SGD {
    lr: f64,
    momentum: f64,
    velocities: Vec<Option<Array1<f64>>>,
}

impl SGD {
    /// Create a new SGD optimizer.
    pub fn new(lr: f64, momentum: f64) -> Self {
        Self { lr, momentum, velocities: Vec::new() }
    }

    fn ensure_velocities(&mut self, n: usize) {
        if self.velocities.len() != n {
            self.velocities = vec![None; n];
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        self.ensure_velocities(params.len());

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                if self.momentum > 0.0 {
                    // v = momentum·v − lr·grad
                    let velocity = match &self.velocities[i] {
                        Some(v) => v * self.momentum - &grad * self.lr,
                        None => &grad * (-self.lr),
                    };

                    let new_data = param.data() + &velocity;
                    *param.data_mut() = new_data;
                    self.velocities[i] = Some(velocity);
                } else {
                    let new_data = param.data() - &(&grad * self.lr);
                    *param.data_mut() = new_data;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.velocities.clear();
    }

    fn lr(&self) -> f64 {
        self.lr
    }

    fn set_lr(&mut self, lr: f64) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_plain_sgd_update() {
        let mut param = Tensor::from_vec(vec![1.0, 2.0], true);
        param.set_grad(arr1(&[0.5, 1.0]));

        let mut opt = SGD::new(0.1, 0.0);
        opt.step(&mut [&mut param]);

        assert_abs_diff_eq!(param.data()[0], 0.95, epsilon = 1e-12);
        assert_abs_diff_eq!(param.data()[1], 1.9, epsilon = 1e-12);
    }

    #[test]
    fn test_momentum_accumulates() {
        let mut param = Tensor::from_vec(vec![0.0], true);
        let mut opt = SGD::new(0.1, 0.9);

        param.set_grad(arr1(&[1.0]));
        opt.step(&mut [&mut param]);
        let first_move = param.data()[0];

        param.set_grad(arr1(&[1.0]));
        opt.step(&mut [&mut param]);
        let second_move = param.data()[0] - first_move;

        // momentum makes the second move larger
        assert!(second_move.abs() > first_move.abs());
    }

    #[test]
    fn test_reset_clears_velocity() {
        let mut param = Tensor::from_vec(vec![0.0], true);
        let mut opt = SGD::new(0.1, 0.9);

        param.set_grad(arr1(&[1.0]));
        opt.step(&mut [&mut param]);

        opt.reset();

        let before = param.data()[0];
        param.set_grad(arr1(&[1.0]));
        opt.step(&mut [&mut param]);

        // fresh velocity: same magnitude as a first step
        assert_abs_diff_eq!(param.data()[0] - before, -0.1, epsilon = 1e-12);
    }
}
