//! Integrar CLI
//!
//! Single-command entry point: synthesize the oscillator dataset, train the
//! neural vector field through the full curriculum, and report how the
//! trained model tracks the first sample.
//!
//! # Usage
//!
//! ```bash
//! # Train with the reference configuration
//! integrar
//!
//! # Smaller, faster run
//! integrar --dataset-size 64 --width 32 --steps 200,200
//!
//! # Custom three-stage curriculum
//! integrar --lr 3e-3,1e-3,1e-3 --steps 300,300,400 --length 0.1,0.5,1.0
//! ```

use clap::Parser;
use integrar::data::{synthesize, SynthOptions};
use integrar::field::MlpField;
use integrar::optim::{Adam, Optimizer, SGD};
use integrar::train::{Curriculum, Stage, TrainConfig, Trainer};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "integrar", about = "Train a neural ODE on a synthetic oscillator")]
struct Cli {
    /// Number of synthesized trajectories
    #[arg(long, default_value_t = 256)]
    dataset_size: usize,

    /// Samples per optimization step
    #[arg(long, default_value_t = 32)]
    batch_size: usize,

    /// Hidden width of the learned field
    #[arg(long, default_value_t = 64)]
    width: usize,

    /// Hidden depth of the learned field
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Random seed
    #[arg(long, default_value_t = 5678)]
    seed: u64,

    /// Print the loss every N steps (0 = silent)
    #[arg(long, default_value_t = 100)]
    log_every: usize,

    /// Per-stage learning rates
    #[arg(long, value_delimiter = ',', default_values_t = [3e-3, 3e-3])]
    lr: Vec<f64>,

    /// Per-stage step counts
    #[arg(long, value_delimiter = ',', default_values_t = [500, 500])]
    steps: Vec<usize>,

    /// Per-stage trajectory-length fractions
    #[arg(long, value_delimiter = ',', default_values_t = [0.1, 1.0])]
    length: Vec<f64>,

    /// Relative tolerance of the integrator
    #[arg(long, default_value_t = 1e-3)]
    rtol: f64,

    /// Absolute tolerance of the integrator
    #[arg(long, default_value_t = 1e-6)]
    atol: f64,

    /// Optional global-norm gradient clip
    #[arg(long)]
    grad_clip: Option<f64>,

    /// Use plain SGD instead of Adam
    #[arg(long)]
    sgd: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.lr.len() != cli.steps.len() || cli.lr.len() != cli.length.len() {
        return Err("--lr, --steps and --length must list one value per stage".into());
    }

    let stages = cli
        .lr
        .iter()
        .zip(&cli.steps)
        .zip(&cli.length)
        .map(|((&lr, &steps), &length_fraction)| Stage { lr, steps, length_fraction })
        .collect();
    let curriculum = Curriculum::new(stages)?;

    let mut config = TrainConfig {
        dataset_size: cli.dataset_size,
        batch_size: cli.batch_size,
        width: cli.width,
        depth: cli.depth,
        seed: cli.seed,
        log_every: cli.log_every,
        grad_clip: cli.grad_clip,
        ..Default::default()
    };
    config.solve.controller.rtol = cli.rtol;
    config.solve.controller.atol = cli.atol;

    let mut synth = SynthOptions::default();
    synth.solve.controller.rtol = cli.rtol;
    synth.solve.controller.atol = cli.atol;

    let mut rng = StdRng::seed_from_u64(config.seed);

    println!("synthesizing {} trajectories", config.dataset_size);
    let dataset = synthesize(config.dataset_size, &synth, &mut rng)?;

    let field = MlpField::new(dataset.data_size(), config.width, config.depth, &mut rng);
    println!("field: {} parameters", field.n_params());

    let first_lr = curriculum.stages()[0].lr;
    let optimizer: Box<dyn Optimizer> = if cli.sgd {
        Box::new(SGD::new(first_lr, 0.9))
    } else {
        Box::new(Adam::default_params(first_lr))
    };

    let mut trainer = Trainer::new(field, optimizer, config);
    let result = trainer.train(&dataset, &curriculum, &mut rng)?;

    if let (Some(first), Some(last)) = (result.first_loss(), result.final_loss()) {
        println!("loss: first {first:.6}, final {last:.6}");
    }

    report_first_sample(&trainer, &dataset)?;
    Ok(())
}

/// Target-vs-predicted table for the first dataset sample.
fn report_first_sample(
    trainer: &Trainer,
    dataset: &integrar::data::Dataset,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = &dataset.ys[0];
    let predicted = trainer.predict(&dataset.ts, &target.row(0).to_owned())?;

    println!("\nfirst sample, target vs predicted:");
    println!("{:>8}  {:>10} {:>10}  {:>10} {:>10}", "t", "y0", "y1", "ŷ0", "ŷ1");
    let stride = (dataset.ts.len() / 10).max(1);
    for i in (0..dataset.ts.len()).step_by(stride) {
        println!(
            "{:>8.3}  {:>10.5} {:>10.5}  {:>10.5} {:>10.5}",
            dataset.ts[i],
            target[[i, 0]],
            target[[i, 1]],
            predicted[[i, 0]],
            predicted[[i, 1]],
        );
    }
    Ok(())
}
