//! Differentiable adaptive-step ODE integration and neural-ODE training.
//!
//! The crate is built around three layers:
//!
//! - [`autograd`] — a reverse-mode gradient tape over `f64` vectors. Every
//!   differentiable operation appends a backward record to a [`Tape`]; one
//!   reverse sweep propagates gradients through the exact sequence of
//!   operations the forward pass performed.
//! - [`ode`] — an explicit embedded Runge-Kutta solver (Tsitouras 5(4), FSAL)
//!   with a PID step-size controller and cubic Hermite dense output. The
//!   accepted-step arithmetic is recorded on the tape, so trajectories are
//!   differentiable with respect to the initial state and any learnable
//!   parameters of the vector field. Step-size decisions are made on raw
//!   values and never differentiated.
//! - [`train`] — a curriculum trainer that fits a feed-forward vector field
//!   ([`field::MlpField`]) to trajectories synthesized from a fixed
//!   oscillator ([`field::RationalOscillator`]), using the optimizers in
//!   [`optim`] and the shuffled batch sampler in [`train::BatchSampler`].
//!
//! # Example
//!
//! ```no_run
//! use integrar::data::{synthesize, SynthOptions};
//! use integrar::field::MlpField;
//! use integrar::optim::Adam;
//! use integrar::train::{Curriculum, TrainConfig, Trainer};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let config = TrainConfig::default();
//! let mut rng = StdRng::seed_from_u64(config.seed);
//! let dataset = synthesize(config.dataset_size, &SynthOptions::default(), &mut rng)?;
//!
//! let field = MlpField::new(2, config.width, config.depth, &mut rng);
//! let optimizer = Adam::default_params(3e-3);
//! let mut trainer = Trainer::new(field, Box::new(optimizer), config);
//!
//! let result = trainer.train(&dataset, &Curriculum::reference(), &mut rng)?;
//! println!("final loss: {:?}", result.final_loss());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod autograd;
pub mod data;
pub mod field;
pub mod ode;
pub mod optim;
pub mod train;

pub use autograd::{Tape, Tensor};
