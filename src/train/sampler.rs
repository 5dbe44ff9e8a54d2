//! Shuffled batch sampler

use super::TrainError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Draws batches of sample indices without replacement from a shuffled
/// permutation, reshuffling once a pass over the dataset is exhausted.
///
/// Tail batches smaller than the configured size are dropped, never padded,
/// so every batch the sampler yields has exactly `batch_size` indices. The
/// sequence is infinite and, for a fixed RNG seed, reproducible.
#[derive(Debug, Clone)]
pub struct BatchSampler {
    perm: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    rng: StdRng,
}

impl BatchSampler {
    /// Create a sampler over `n_samples` dataset indices.
    ///
    /// Fails with [`TrainError::EmptyBatch`] when the dataset cannot fill a
    /// single batch.
    pub fn new(n_samples: usize, batch_size: usize, rng: StdRng) -> Result<Self, TrainError> {
        if batch_size == 0 || n_samples < batch_size {
            return Err(TrainError::EmptyBatch { batch_size, available: n_samples });
        }

        let mut sampler =
            Self { perm: (0..n_samples).collect(), cursor: 0, batch_size, rng };
        sampler.reshuffle();
        Ok(sampler)
    }

    fn reshuffle(&mut self) {
        self.perm.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Next batch of indices; reshuffles at the epoch boundary.
    pub fn next_batch(&mut self) -> Vec<usize> {
        if self.cursor + self.batch_size > self.perm.len() {
            self.reshuffle();
        }
        let batch = self.perm[self.cursor..self.cursor + self.batch_size].to_vec();
        self.cursor += self.batch_size;
        batch
    }

    /// Full batches per pass over the dataset.
    #[must_use]
    pub fn batches_per_epoch(&self) -> usize {
        self.perm.len() / self.batch_size
    }
}

impl Iterator for BatchSampler {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_batch())
    }
}
