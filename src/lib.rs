pub mod baseline;
pub mod classifier;
pub mod cli;
pub mod corpus;
pub mod error;
pub mod estimator;
pub mod evaluate;
pub mod normalize;
pub mod tokenize;

pub use baseline::{ConstantFilter, RandomFilter};
pub use classifier::{BayesFilter, spam_probability};
pub use error::{Error, Result};
pub use estimator::{TrainingExample, WordStats};
pub use normalize::{Leaf, Normalizer};

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    /// Label as written in `!truth.txt` and `!prediction.txt`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Ham => "OK",
            Label::Spam => "SPAM",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Label::Ham),
            "SPAM" => Ok(Label::Spam),
            other => Err(format!("unknown label {other:?}, expected OK or SPAM")),
        }
    }
}

/// Filename to label, ordered by filename.
pub type Predictions = BTreeMap<String, Label>;

/// The capability shared by the statistical filter and the baselines.
///
/// `train` is fed a corpus directory containing `!truth.txt`, `test` a
/// directory of unlabeled messages. `test` never writes into the directory;
/// persisting the result is left to the caller.
pub trait Filter {
    fn train(&mut self, training_dir: &Path) -> Result<()>;
    fn test(&self, test_dir: &Path) -> Result<Predictions>;
}

/// Scoring and training constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// rating of a token never seen in training
    pub unknown_rating: f64,
    /// combined probability at or above which a message is spam
    pub spam_threshold: f64,
    /// rating lists at least this long are trimmed to their extremes
    pub trim_threshold: usize,
    /// number of lowest and of highest ratings kept when trimming
    pub extreme_count: usize,
    pub min_spaminess: f64,
    pub max_spaminess: f64,
    /// nesting limit for multipart and embedded messages
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unknown_rating: 0.4,
            spam_threshold: 0.95,
            trim_threshold: 20,
            extreme_count: 10,
            min_spaminess: 0.01,
            max_spaminess: 0.99,
            max_depth: 32,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn unknown_rating(mut self, rating: f64) -> Self {
        self.config.unknown_rating = rating;
        self
    }
    pub fn spam_threshold(mut self, threshold: f64) -> Self {
        self.config.spam_threshold = threshold;
        self
    }
    pub fn trim_threshold(mut self, len: usize) -> Self {
        self.config.trim_threshold = len;
        self
    }
    pub fn extreme_count(mut self, count: usize) -> Self {
        self.config.extreme_count = count;
        self
    }
    pub fn spaminess_bounds(mut self, min: f64, max: f64) -> Self {
        self.config.min_spaminess = min;
        self.config.max_spaminess = max;
        self
    }
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }
    pub fn build(self) -> Config {
        self.config
    }
}

#[test]
fn test_label_text() {
    assert_eq!("OK".parse::<Label>(), Ok(Label::Ham));
    assert_eq!("SPAM".parse::<Label>(), Ok(Label::Spam));
    assert!("spam".parse::<Label>().is_err());
    assert_eq!(Label::Spam.to_string(), "SPAM");
}

#[test]
fn test_config_builder() {
    let config = Config::builder().spam_threshold(0.9).max_depth(4).build();
    assert_eq!(config.spam_threshold, 0.9);
    assert_eq!(config.max_depth, 4);
    assert_eq!(config.unknown_rating, Config::default().unknown_rating);
}
