//! Learnable feed-forward vector field

use super::VectorField;
use crate::autograd::{ops, Tape, Tensor};
use rand::rngs::StdRng;
use rand::Rng;

/// One dense layer `y = W·x + b`.
#[derive(Debug, Clone)]
struct Linear {
    w: Tensor,
    b: Tensor,
    rows: usize,
    cols: usize,
}

impl Linear {
    fn new(rows: usize, cols: usize, rng: &mut StdRng) -> Self {
        // Uniform ±1/√fan_in, the usual dense-layer initialization.
        let bound = 1.0 / (cols as f64).sqrt();
        let w: Vec<f64> = (0..rows * cols).map(|_| rng.random_range(-bound..bound)).collect();
        let b: Vec<f64> = (0..rows).map(|_| rng.random_range(-bound..bound)).collect();
        Self {
            w: Tensor::from_vec(w, true),
            b: Tensor::from_vec(b, true),
            rows,
            cols,
        }
    }

    fn forward(&self, tape: &Tape, x: &Tensor) -> Tensor {
        let wx = ops::matvec(tape, &self.w, x, self.rows, self.cols);
        ops::add(tape, &wx, &self.b)
    }
}

/// Feed-forward network standing in for an unknown vector field.
///
/// `depth` hidden layers of `width` units with softplus activations, and a
/// tanh on the output layer to keep the predicted derivatives bounded. The
/// field is autonomous: the time argument is ignored.
#[derive(Debug, Clone)]
pub struct MlpField {
    layers: Vec<Linear>,
    data_size: usize,
}

impl MlpField {
    /// Build a field with freshly initialized parameters drawn from `rng`.
    pub fn new(data_size: usize, width: usize, depth: usize, rng: &mut StdRng) -> Self {
        assert!(data_size >= 1, "data_size must be at least 1");
        assert!(width >= 1, "width must be at least 1");
        assert!(depth >= 1, "depth must be at least 1");

        let mut layers = Vec::with_capacity(depth + 1);
        layers.push(Linear::new(width, data_size, rng));
        for _ in 1..depth {
            layers.push(Linear::new(width, width, rng));
        }
        layers.push(Linear::new(data_size, width, rng));

        Self { layers, data_size }
    }

    /// Shared handles to the learnable parameters, layer by layer.
    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| [&l.w, &l.b]).collect()
    }

    /// Mutable handles for the optimizer.
    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers.iter_mut().flat_map(|l| [&mut l.w, &mut l.b]).collect()
    }

    /// Total parameter count.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.params().iter().map(|p| p.len()).sum()
    }
}

impl VectorField for MlpField {
    fn dim(&self) -> usize {
        self.data_size
    }

    fn eval(&self, tape: &Tape, _t: f64, y: &Tensor) -> Tensor {
        let last = self.layers.len() - 1;
        let mut h = y.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = layer.forward(tape, &h);
            h = if i < last { ops::softplus(tape, &h) } else { ops::tanh(tape, &h) };
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_shapes() {
        let mut rng = StdRng::seed_from_u64(0);
        let field = MlpField::new(2, 8, 2, &mut rng);
        assert_eq!(field.dim(), 2);
        // 8x2 + 8, 8x8 + 8, 2x8 + 2
        assert_eq!(field.n_params(), 16 + 8 + 64 + 8 + 16 + 2);
        assert_eq!(field.params().len(), 6);
    }

    #[test]
    fn test_eval_output_dim_and_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = MlpField::new(3, 16, 1, &mut rng);
        let tape = Tape::new();
        let y = Tensor::from_vec(vec![0.5, -0.2, 1.0], false);
        let dy = field.eval(&tape, 0.0, &y);
        assert_eq!(dy.len(), 3);
        // tanh output layer
        assert!(dy.data().iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_eval_deterministic_for_seed() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let fa = MlpField::new(2, 8, 2, &mut rng_a);
        let fb = MlpField::new(2, 8, 2, &mut rng_b);

        let tape = Tape::new();
        let y = Tensor::from_vec(vec![0.3, 0.7], false);
        assert_eq!(fa.eval(&tape, 0.0, &y).data(), fb.eval(&tape, 0.0, &y).data());
    }

    #[test]
    fn test_gradients_reach_all_params() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = MlpField::new(2, 4, 1, &mut rng);
        let tape = Tape::new();
        let y = Tensor::from_vec(vec![0.1, 0.2], false);
        let dy = field.eval(&tape, 0.0, &y);

        tape.backward(&dy);
        for p in field.params() {
            assert!(p.grad().is_some(), "parameter missing a gradient");
        }
    }
}
