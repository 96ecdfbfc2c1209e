//! Reference filters that ignore message content.

use crate::corpus::{self, TRUTH_FILE};
use crate::{Error, Filter, Label, Predictions, Result};
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use std::path::Path;

/// Labels every message the same way.
#[derive(Debug, Clone)]
pub struct ConstantFilter {
    label: Label,
    trained: bool,
}

impl ConstantFilter {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            trained: false,
        }
    }

    /// Everything is ham.
    pub fn naive() -> Self {
        Self::new(Label::Ham)
    }

    /// Everything is spam.
    pub fn paranoid() -> Self {
        Self::new(Label::Spam)
    }
}

impl Filter for ConstantFilter {
    fn train(&mut self, training_dir: &Path) -> Result<()> {
        corpus::read_classification_from_file(&training_dir.join(TRUTH_FILE))?;
        self.trained = true;
        Ok(())
    }

    fn test(&self, test_dir: &Path) -> Result<Predictions> {
        if !self.trained {
            return Err(Error::UntrainedUse);
        }
        Ok(corpus::list_messages(test_dir)?
            .into_iter()
            .map(|name| (name, self.label))
            .collect())
    }
}

/// Flips a fair coin per message. With a seed, repeated runs agree.
#[derive(Debug, Clone, Default)]
pub struct RandomFilter {
    seed: Option<u64>,
    trained: bool,
}

impl RandomFilter {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            trained: false,
        }
    }
}

impl Filter for RandomFilter {
    fn train(&mut self, training_dir: &Path) -> Result<()> {
        corpus::read_classification_from_file(&training_dir.join(TRUTH_FILE))?;
        self.trained = true;
        Ok(())
    }

    fn test(&self, test_dir: &Path) -> Result<Predictions> {
        if !self.trained {
            return Err(Error::UntrainedUse);
        }
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Ok(corpus::list_messages(test_dir)?
            .into_iter()
            .map(|name| {
                let label = if rng.random_bool(0.5) {
                    Label::Spam
                } else {
                    Label::Ham
                };
                (name, label)
            })
            .collect())
    }
}
