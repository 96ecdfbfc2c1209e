use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wordfilter::corpus::{PREDICTION_FILE, TRUTH_FILE, write_classification_to_file};
use wordfilter::{BayesFilter, ConstantFilter, Error, Filter, Label, RandomFilter};

fn message(body: &str) -> String {
    format!("From: someone@example.com\r\nSubject: test\r\n\r\n{body}\r\n")
}

fn write_corpus(dir: &Path, entries: &[(&str, &str, Option<Label>)]) {
    let mut truth = String::new();
    for (name, body, label) in entries {
        fs::write(dir.join(name), message(body)).unwrap();
        if let Some(label) = label {
            truth.push_str(&format!("{name} {label}\n"));
        }
    }
    if !truth.is_empty() {
        fs::write(dir.join(TRUTH_FILE), truth).unwrap();
    }
}

fn corpora() -> (TempDir, TempDir) {
    let train = TempDir::new().unwrap();
    let test = TempDir::new().unwrap();
    write_corpus(
        train.path(),
        &[
            ("spam.eml", "viagra", Some(Label::Spam)),
            ("ham.eml", "meeting", Some(Label::Ham)),
        ],
    );
    write_corpus(
        test.path(),
        &[
            ("a.eml", &"viagra ".repeat(25), None),
            ("b.eml", &"meeting ".repeat(25), None),
            ("c.eml", "<html><body><br></body></html>", None),
        ],
    );
    (train, test)
}

#[test]
fn train_and_test() {
    let (train, test) = corpora();
    let mut filter = BayesFilter::default();
    filter.train(train.path()).unwrap();

    let stats = filter.stats().unwrap();
    assert_eq!(stats.spaminess("viagra"), Some(0.99));
    assert_eq!(stats.spaminess("meeting"), Some(0.01));
    assert_eq!(stats.total_spam() + stats.total_ham(), 2);

    let predictions = filter.test(test.path()).unwrap();
    assert_eq!(predictions.len(), 3);
    assert_eq!(predictions["a.eml"], Label::Spam);
    assert_eq!(predictions["b.eml"], Label::Ham);
    // nothing left after stripping markup
    assert_eq!(predictions["c.eml"], Label::Spam);
}

#[test]
fn test_is_idempotent() {
    let (train, test) = corpora();
    let mut filter = BayesFilter::default();
    filter.train(train.path()).unwrap();
    let first = filter.test(test.path()).unwrap();
    write_classification_to_file(&first, &test.path().join(PREDICTION_FILE)).unwrap();
    let second = filter.test(test.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_before_train() {
    let (_train, test) = corpora();
    let filter = BayesFilter::default();
    assert!(matches!(filter.test(test.path()), Err(Error::UntrainedUse)));
    let naive = ConstantFilter::naive();
    assert!(matches!(naive.test(test.path()), Err(Error::UntrainedUse)));
}

#[test]
fn degenerate_training_set() {
    let train = TempDir::new().unwrap();
    write_corpus(
        train.path(),
        &[
            ("1.eml", "casino bonus", Some(Label::Spam)),
            ("2.eml", "casino jackpot", Some(Label::Spam)),
        ],
    );
    let mut filter = BayesFilter::default();
    assert!(matches!(
        filter.train(train.path()),
        Err(Error::DegenerateCorpus { spam: 2, ham: 0 })
    ));
    assert!(matches!(filter.stats(), Err(Error::UntrainedUse)));
}

#[test]
fn missing_message_file() {
    let train = TempDir::new().unwrap();
    write_corpus(train.path(), &[("1.eml", "hello there", Some(Label::Ham))]);
    fs::write(train.path().join(TRUTH_FILE), "1.eml OK\n2.eml SPAM\n").unwrap();
    let mut filter = BayesFilter::default();
    assert!(matches!(filter.train(train.path()), Err(Error::Io { .. })));
}

#[test]
fn missing_truth_file() {
    let (_train, test) = corpora();
    let mut filter = BayesFilter::default();
    assert!(matches!(
        filter.train(test.path()),
        Err(Error::CorpusFormat { .. })
    ));
}

#[test]
fn constant_filters() {
    let (train, test) = corpora();
    let mut naive = ConstantFilter::naive();
    naive.train(train.path()).unwrap();
    let predictions = naive.test(test.path()).unwrap();
    assert_eq!(predictions.len(), 3);
    assert!(predictions.values().all(|&l| l == Label::Ham));

    let mut paranoid = ConstantFilter::paranoid();
    paranoid.train(train.path()).unwrap();
    assert!(
        paranoid
            .test(test.path())
            .unwrap()
            .values()
            .all(|&l| l == Label::Spam)
    );
}

#[test]
fn random_filter() {
    let (train, test) = corpora();
    let mut random = RandomFilter::new(Some(7));
    random.train(train.path()).unwrap();
    let first = random.test(test.path()).unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, random.test(test.path()).unwrap());
}

#[test]
fn filters_behind_trait_object() {
    let (train, test) = corpora();
    let mut filters: Vec<Box<dyn Filter>> = vec![
        Box::new(BayesFilter::default()),
        Box::new(ConstantFilter::naive()),
        Box::new(RandomFilter::new(None)),
    ];
    for filter in &mut filters {
        filter.train(train.path()).unwrap();
        assert_eq!(filter.test(test.path()).unwrap().len(), 3);
    }
}

#[test]
fn empty_and_headerless_messages() {
    let (train, test) = corpora();
    fs::write(test.path().join("empty.eml"), b"").unwrap();
    fs::write(test.path().join("bare.eml"), "viagra ".repeat(25)).unwrap();
    let mut filter = BayesFilter::default();
    filter.train(train.path()).unwrap();
    let predictions = filter.test(test.path()).unwrap();
    assert_eq!(predictions.len(), 5);
    assert_eq!(predictions["empty.eml"], Label::Spam);
    assert_eq!(predictions["bare.eml"], Label::Spam);
}
