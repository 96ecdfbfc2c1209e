//! The statistical filter: word spaminess combined over a message.

use crate::corpus::{self, TRUTH_FILE};
use crate::estimator::{TrainingExample, WordStats};
use crate::normalize::Normalizer;
use crate::{Config, Error, Filter, Label, Predictions, Result};
use std::path::Path;
use tracing::{debug, info};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Combined spam probability of a rating list, `None` if it is empty.
///
/// Long lists are reduced to their `extreme_count` lowest and highest
/// ratings first, which keeps the products away from underflow.
pub fn spam_probability(mut ratings: Vec<f64>, config: &Config) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    if ratings.len() >= config.trim_threshold {
        ratings.sort_by(f64::total_cmp);
        let keep = config.extreme_count.min(ratings.len() / 2);
        let tail = ratings.split_off(ratings.len() - keep);
        ratings.truncate(keep);
        ratings.extend(tail);
    }
    let spam_product: f64 = ratings.iter().product();
    let ham_product: f64 = ratings.iter().map(|r| 1.0 - r).product();
    let p = spam_product / (spam_product + ham_product);
    Some(if p.is_finite() { p } else { 0.5 })
}

pub struct BayesFilter {
    config: Config,
    normalizer: Normalizer,
    stats: Option<WordStats>,
}

impl Default for BayesFilter {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl BayesFilter {
    pub fn new(config: Config) -> Self {
        Self {
            normalizer: Normalizer::new(&config),
            config,
            stats: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces any earlier model.
    pub fn train_examples(&mut self, examples: &[TrainingExample]) -> Result<()> {
        self.stats = Some(WordStats::train(examples, &self.config)?);
        Ok(())
    }

    pub fn stats(&self) -> Result<&WordStats> {
        self.stats.as_ref().ok_or(Error::UntrainedUse)
    }

    pub fn ratings(&self, tokens: &[String]) -> Result<Vec<f64>> {
        let stats = self.stats()?;
        let unknown = self.config.unknown_rating;
        Ok(tokens
            .iter()
            .map(|token| {
                if stats.contains(token) {
                    stats.spaminess(token).unwrap_or(unknown)
                } else {
                    unknown
                }
            })
            .collect())
    }

    pub fn score(&self, tokens: &[String]) -> Result<Option<f64>> {
        Ok(spam_probability(self.ratings(tokens)?, &self.config))
    }

    /// A message without a single usable token is spam.
    pub fn classify(&self, tokens: &[String]) -> Result<Label> {
        Ok(match self.score(tokens)? {
            Some(p) if p >= self.config.spam_threshold => Label::Spam,
            Some(_) => Label::Ham,
            None => Label::Spam,
        })
    }

    pub fn classify_message(&self, raw: &[u8]) -> Result<Label> {
        self.classify(&self.normalizer.normalize(raw)?)
    }

    fn classify_file(&self, dir: &Path, name: &str) -> Result<(String, Label)> {
        let tokens = self.normalizer.normalize_file(&dir.join(name))?;
        let label = self.classify(&tokens)?;
        debug!(message = name, tokens = tokens.len(), %label, "classified");
        Ok((name.to_string(), label))
    }
}

impl Filter for BayesFilter {
    fn train(&mut self, training_dir: &Path) -> Result<()> {
        let truth = corpus::read_classification_from_file(&training_dir.join(TRUTH_FILE))?;
        let examples = truth
            .into_iter()
            .map(|(name, label)| {
                let tokens = self.normalizer.normalize_file(&training_dir.join(&name))?;
                Ok(TrainingExample::new(name, tokens, label))
            })
            .collect::<Result<Vec<_>>>()?;
        self.train_examples(&examples)
    }

    fn test(&self, test_dir: &Path) -> Result<Predictions> {
        self.stats()?;
        let files = corpus::list_messages(test_dir)?;

        #[cfg(feature = "rayon")]
        let predictions = files
            .par_iter()
            .map(|name| self.classify_file(test_dir, name))
            .collect::<Result<Predictions>>()?;

        #[cfg(not(feature = "rayon"))]
        let predictions = files
            .iter()
            .map(|name| self.classify_file(test_dir, name))
            .collect::<Result<Predictions>>()?;

        let spam = predictions.values().filter(|&&l| l == Label::Spam).count();
        info!(messages = predictions.len(), spam, "tested");
        Ok(predictions)
    }
}

#[cfg(test)]
fn words(word: &str, n: usize) -> Vec<String> {
    vec![word.to_string(); n]
}

#[cfg(test)]
fn trained() -> BayesFilter {
    let mut filter = BayesFilter::default();
    filter
        .train_examples(&[
            TrainingExample::new("1", words("viagra", 1), Label::Spam),
            TrainingExample::new("2", words("meeting", 1), Label::Ham),
        ])
        .unwrap();
    filter
}

#[test]
fn test_untrained() {
    let filter = BayesFilter::default();
    assert!(matches!(
        filter.classify(&words("viagra", 3)),
        Err(Error::UntrainedUse)
    ));
    assert!(matches!(
        filter.test(Path::new("/nonexistent")),
        Err(Error::UntrainedUse)
    ));
}

#[test]
fn test_empty_is_spam() {
    assert_eq!(trained().classify(&[]).unwrap(), Label::Spam);
    assert_eq!(spam_probability(Vec::new(), &Config::default()), None);
    assert_eq!(trained().classify_message(b"").unwrap(), Label::Spam);
}

#[test]
fn test_extreme_words() {
    let filter = trained();
    assert_eq!(filter.classify(&words("viagra", 25)).unwrap(), Label::Spam);
    assert_eq!(filter.classify(&words("meeting", 25)).unwrap(), Label::Ham);
    assert_eq!(filter.classify(&words("viagra", 1)).unwrap(), Label::Spam);
}

#[test]
fn test_unknown_words() {
    let filter = trained();
    assert_eq!(filter.ratings(&words("lorem", 2)).unwrap(), [0.4, 0.4]);
    // 0.4^5 / (0.4^5 + 0.6^5)
    let p = filter.score(&words("lorem", 5)).unwrap().unwrap();
    assert!((p - 0.116_363).abs() < 1e-5, "{p}");
    assert_eq!(filter.classify(&words("lorem", 5)).unwrap(), Label::Ham);
}

#[test]
fn test_neutral_ratings_cancel() {
    let config = Config::default();
    let strong = vec![0.99; 10];
    let mut padded = strong.clone();
    padded.extend([0.5; 10]);
    let expected = spam_probability(strong, &config).unwrap();
    let p = spam_probability(padded, &config).unwrap();
    assert!((p - expected).abs() < 1e-12);
    assert!(p >= config.spam_threshold);
}

#[test]
fn test_trimming_keeps_extremes() {
    let config = Config::default();
    let mut ratings = vec![0.99; 10];
    ratings.extend([0.6; 20]);
    ratings.extend([0.02; 10]);
    let mut extremes = vec![0.02; 10];
    extremes.extend([0.99; 10]);
    let p = spam_probability(ratings, &config).unwrap();
    let expected = spam_probability(extremes, &config).unwrap();
    assert!((p - expected).abs() < 1e-12);
}

#[test]
fn test_short_lists_are_not_trimmed() {
    let config = Config::default();
    let ratings = vec![0.99, 0.99, 0.01, 0.3, 0.3];
    let spam: f64 = ratings.iter().product();
    let ham: f64 = ratings.iter().map(|r| 1.0 - r).product();
    let p = spam_probability(ratings, &config).unwrap();
    assert!((p - spam / (spam + ham)).abs() < 1e-12);
}

#[test]
fn test_threshold_is_inclusive() {
    let mut filter = BayesFilter::new(Config::builder().spam_threshold(0.5).build());
    filter
        .train_examples(&[
            TrainingExample::new("1", words("offer", 1), Label::Spam),
            TrainingExample::new("2", words("offer", 1), Label::Ham),
        ])
        .unwrap();
    assert_eq!(filter.stats().unwrap().spaminess("offer"), Some(0.5));
    assert_eq!(filter.classify(&words("offer", 3)).unwrap(), Label::Spam);
}
