//! Per-token spaminess estimated from a labeled corpus.

use crate::{Config, Error, Label, Result};
use std::collections::{HashMap, HashSet};
use tracing::info;

#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub id: String,
    pub tokens: Vec<String>,
    pub label: Label,
}

impl TrainingExample {
    pub fn new(id: impl Into<String>, tokens: Vec<String>, label: Label) -> Self {
        Self {
            id: id.into(),
            tokens,
            label,
        }
    }
}

/// Word statistics of one training run.
///
/// Counters hold token occurrences summed over all messages of a class, not
/// the number of messages containing the token.
#[derive(Debug, Clone, Default)]
pub struct WordStats {
    words: HashMap<String, u64>,
    spam_words: HashMap<String, u64>,
    ham_words: HashMap<String, u64>,
    vocabulary: HashSet<String>,
    spaminess: HashMap<String, f64>,
    total_spam: usize,
    total_ham: usize,
}

fn count_into(counter: &mut HashMap<String, u64>, tokens: &[String]) {
    for token in tokens {
        *counter.entry(token.clone()).or_default() += 1;
    }
}

impl WordStats {
    pub fn train(examples: &[TrainingExample], config: &Config) -> Result<Self> {
        let mut stats = WordStats::default();
        let mut ham_seen = 0usize;
        for example in examples {
            match example.label {
                Label::Spam => {
                    count_into(&mut stats.spam_words, &example.tokens);
                    stats.total_spam += 1;
                }
                Label::Ham => {
                    count_into(&mut stats.ham_words, &example.tokens);
                    ham_seen += 1;
                }
            }
            count_into(&mut stats.words, &example.tokens);
            stats.vocabulary.extend(example.tokens.iter().cloned());
        }
        stats.total_ham = examples.len() - stats.total_spam;
        debug_assert_eq!(stats.total_ham, ham_seen);

        if stats.total_spam == 0 || stats.total_ham == 0 {
            return Err(Error::DegenerateCorpus {
                spam: stats.total_spam,
                ham: stats.total_ham,
            });
        }

        stats.spaminess = stats
            .vocabulary
            .iter()
            .map(|word| (word.clone(), stats.estimate(word, config)))
            .collect();

        info!(
            messages = examples.len(),
            spam = stats.total_spam,
            ham = stats.total_ham,
            vocabulary = stats.vocabulary.len(),
            "trained"
        );
        Ok(stats)
    }

    fn estimate(&self, word: &str, config: &Config) -> f64 {
        let spam = self.spam_count(word);
        let ham = self.ham_count(word);
        match (spam, ham) {
            (1.., 0) => config.max_spaminess,
            (0, 1..) => config.min_spaminess,
            _ => {
                let spam_likelihood = spam as f64 / self.total_spam as f64;
                let ham_likelihood = ham as f64 / self.total_ham as f64;
                (spam_likelihood / (spam_likelihood + ham_likelihood))
                    .clamp(config.min_spaminess, config.max_spaminess)
            }
        }
    }

    pub fn spaminess(&self, word: &str) -> Option<f64> {
        self.spaminess.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vocabulary.contains(word)
    }

    pub fn spam_count(&self, word: &str) -> u64 {
        self.spam_words.get(word).copied().unwrap_or(0)
    }

    pub fn ham_count(&self, word: &str) -> u64 {
        self.ham_words.get(word).copied().unwrap_or(0)
    }

    /// Occurrences in either class.
    pub fn word_count(&self, word: &str) -> u64 {
        self.words.get(word).copied().unwrap_or(0)
    }

    pub fn vocabulary(&self) -> &HashSet<String> {
        &self.vocabulary
    }

    pub fn total_spam(&self) -> usize {
        self.total_spam
    }

    pub fn total_ham(&self) -> usize {
        self.total_ham
    }

    pub fn total_emails(&self) -> usize {
        self.total_spam + self.total_ham
    }
}

#[cfg(test)]
fn example(id: &str, text: &str, label: Label) -> TrainingExample {
    TrainingExample::new(id, crate::tokenize::tokenize(text), label)
}

#[test]
fn test_exclusive_words() {
    let examples = [
        example("1", "viagra", Label::Spam),
        example("2", "meeting", Label::Ham),
    ];
    let stats = WordStats::train(&examples, &Config::default()).unwrap();
    assert_eq!(stats.spaminess("viagra"), Some(0.99));
    assert_eq!(stats.spaminess("meeting"), Some(0.01));
    assert_eq!(stats.spaminess("unseen"), None);
    assert_eq!(stats.vocabulary().len(), 2);
}

#[test]
fn test_shared_word() {
    let examples = [
        example("1", "cash cash offer", Label::Spam),
        example("2", "offer meeting", Label::Ham),
        example("3", "meeting notes", Label::Ham),
    ];
    let stats = WordStats::train(&examples, &Config::default()).unwrap();
    assert_eq!(stats.spam_count("cash"), 2);
    assert_eq!(stats.ham_count("meeting"), 2);
    assert_eq!(stats.word_count("offer"), 2);
    // spam 1/1 against ham 1/2
    let offer = stats.spaminess("offer").unwrap();
    assert!((offer - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(stats.spaminess("cash"), Some(0.99));
    assert_eq!(stats.spaminess("notes"), Some(0.01));
}

#[test]
fn test_bounds_and_totals() {
    let mut examples = vec![example("s", &"free ".repeat(20), Label::Spam)];
    examples.push(example("h0", "free lunch", Label::Ham));
    for i in 1..10 {
        examples.push(example(&format!("h{i}"), "quarterly report", Label::Ham));
    }
    let stats = WordStats::train(&examples, &Config::default()).unwrap();
    // 20/1 against 1/10 would exceed the ceiling
    assert_eq!(stats.spaminess("free"), Some(0.99));
    for word in stats.vocabulary() {
        let s = stats.spaminess(word).unwrap();
        assert!((0.01..=0.99).contains(&s), "{word}: {s}");
    }
    assert_eq!(stats.total_spam(), 1);
    assert_eq!(stats.total_ham(), 10);
    assert_eq!(stats.total_emails(), examples.len());
}

#[test]
fn test_floor() {
    let examples = [
        example("1", "newsletter", Label::Spam),
        example("2", &"newsletter ".repeat(200), Label::Ham),
    ];
    let stats = WordStats::train(&examples, &Config::default()).unwrap();
    assert_eq!(stats.spaminess("newsletter"), Some(0.01));
}

#[test]
fn test_degenerate_corpus() {
    let spam_only = [
        example("1", "viagra", Label::Spam),
        example("2", "casino", Label::Spam),
    ];
    assert!(matches!(
        WordStats::train(&spam_only, &Config::default()),
        Err(Error::DegenerateCorpus { spam: 2, ham: 0 })
    ));
    assert!(matches!(
        WordStats::train(&[], &Config::default()),
        Err(Error::DegenerateCorpus { spam: 0, ham: 0 })
    ));
}
