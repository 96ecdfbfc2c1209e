//! Scoring of predictions against the truth, spam being the positive class.

use crate::{Label, Predictions};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    /// truth entries with no prediction
    pub missing: usize,
}

impl ConfusionMatrix {
    pub fn compute(truth: &BTreeMap<String, Label>, predictions: &Predictions) -> Self {
        let mut matrix = ConfusionMatrix::default();
        for (name, &actual) in truth {
            match (actual, predictions.get(name)) {
                (Label::Spam, Some(Label::Spam)) => matrix.true_positives += 1,
                (Label::Ham, Some(Label::Ham)) => matrix.true_negatives += 1,
                (Label::Ham, Some(Label::Spam)) => matrix.false_positives += 1,
                (Label::Spam, Some(Label::Ham)) => matrix.false_negatives += 1,
                (_, None) => matrix.missing += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => (self.true_positives + self.true_negatives) as f64 / n as f64,
        }
    }

    /// Like accuracy, but a ham message lost to the spam folder costs ten
    /// times as much as a spam message let through.
    pub fn quality(&self) -> f64 {
        let correct = (self.true_positives + self.true_negatives) as f64;
        let denominator =
            correct + 10.0 * self.false_positives as f64 + self.false_negatives as f64;
        if denominator == 0.0 {
            0.0
        } else {
            correct / denominator
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "true positives:  {}", self.true_positives)?;
        writeln!(f, "true negatives:  {}", self.true_negatives)?;
        writeln!(f, "false positives: {}", self.false_positives)?;
        writeln!(f, "false negatives: {}", self.false_negatives)?;
        if self.missing > 0 {
            writeln!(f, "missing:         {}", self.missing)?;
        }
        writeln!(f, "accuracy:        {:.4}", self.accuracy())?;
        write!(f, "quality:         {:.4}", self.quality())
    }
}

#[cfg(test)]
fn labels(entries: &[(&str, Label)]) -> BTreeMap<String, Label> {
    entries.iter().map(|(n, l)| (n.to_string(), *l)).collect()
}

#[test]
fn test_perfect_prediction() {
    let truth = labels(&[("a", Label::Spam), ("b", Label::Ham)]);
    let matrix = ConfusionMatrix::compute(&truth, &truth);
    assert_eq!(matrix.true_positives, 1);
    assert_eq!(matrix.true_negatives, 1);
    assert_eq!(matrix.quality(), 1.0);
    assert_eq!(matrix.accuracy(), 1.0);
}

#[test]
fn test_false_positives_weigh_more() {
    let truth = labels(&[("a", Label::Spam), ("b", Label::Ham), ("c", Label::Ham)]);
    let fp = labels(&[("a", Label::Spam), ("b", Label::Spam), ("c", Label::Ham)]);
    let fn_ = labels(&[("a", Label::Ham), ("b", Label::Ham), ("c", Label::Ham)]);
    let with_fp = ConfusionMatrix::compute(&truth, &fp);
    let with_fn = ConfusionMatrix::compute(&truth, &fn_);
    assert_eq!(with_fp.false_positives, 1);
    assert_eq!(with_fn.false_negatives, 1);
    assert_eq!(with_fp.accuracy(), with_fn.accuracy());
    assert!(with_fp.quality() < with_fn.quality());
    assert_eq!(with_fp.quality(), 2.0 / 12.0);
}

#[test]
fn test_missing_predictions() {
    let truth = labels(&[("a", Label::Spam), ("b", Label::Ham)]);
    let partial = labels(&[("a", Label::Spam)]);
    let matrix = ConfusionMatrix::compute(&truth, &partial);
    assert_eq!(matrix.missing, 1);
    assert_eq!(matrix.total(), 1);
}
