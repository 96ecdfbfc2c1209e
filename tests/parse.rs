use std::path::Path;
use wordfilter::{BayesFilter, Label, Normalizer, TrainingExample};

#[test]
fn parse_001() {
    let tokens = Normalizer::default()
        .normalize_file(Path::new("tests/parse_001.eml"))
        .unwrap();
    assert_eq!(
        tokens,
        [
            "win",
            "$1,000,000",
            "today",
            "limited-time",
            "offer",
            "for",
            "our",
            "caf\u{e9}",
            "customers",
            "click",
            "here",
            "claim",
            "your",
            "prize",
        ]
    );
}

#[test]
fn parse_001_text() {
    let raw = std::fs::read("tests/parse_001.eml").unwrap();
    let text = Normalizer::default().message_text(&raw).unwrap();
    assert!(!text.contains("multi-part message"));
    assert!(!text.contains("Mega Deals"));
    assert!(text.contains("<b>Click</b>"));
}

#[test]
fn classify_001() {
    let spam_words = ["win", "offer", "prize", "claim", "click", "$1,000,000"];
    let ham_words = ["agenda", "minutes", "review", "here", "your"];
    let mut filter = BayesFilter::default();
    filter
        .train_examples(&[
            TrainingExample::new(
                "spam",
                spam_words.iter().map(|w| w.to_string()).collect(),
                Label::Spam,
            ),
            TrainingExample::new(
                "ham",
                ham_words.iter().map(|w| w.to_string()).collect(),
                Label::Ham,
            ),
        ])
        .unwrap();
    let raw = std::fs::read("tests/parse_001.eml").unwrap();
    assert_eq!(filter.classify_message(&raw).unwrap(), Label::Spam);
}

#[test]
fn missing_file() {
    let r = Normalizer::default().normalize_file(Path::new("tests/does_not_exist.eml"));
    assert!(matches!(r, Err(wordfilter::Error::Io { .. })));
}
