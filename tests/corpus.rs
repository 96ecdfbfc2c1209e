use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;
use wordfilter::corpus::{
    PREDICTION_FILE, TRUTH_FILE, list_messages, read_classification_from_file,
    write_classification_to_file,
};
use wordfilter::{Error, Label};

#[test]
fn test_read_truth() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(TRUTH_FILE);
    fs::write(&path, "0001.eml OK\n\n0002.eml\tSPAM\n  0003.eml   OK  \n").unwrap();
    let labels = read_classification_from_file(&path).unwrap();
    assert_eq!(labels.len(), 3);
    assert_eq!(labels["0001.eml"], Label::Ham);
    assert_eq!(labels["0002.eml"], Label::Spam);
    assert_eq!(labels["0003.eml"], Label::Ham);
}

#[test]
fn test_missing_truth() {
    let dir = TempDir::new().unwrap();
    let r = read_classification_from_file(&dir.path().join(TRUTH_FILE));
    assert!(matches!(r, Err(Error::CorpusFormat { .. })));
}

#[test]
fn test_malformed_truth() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(TRUTH_FILE);
    for content in ["0001.eml\n", "0001.eml OK extra\n", "0001.eml ham\n"] {
        fs::write(&path, content).unwrap();
        let r = read_classification_from_file(&path);
        assert!(matches!(r, Err(Error::CorpusFormat { .. })), "{content:?}");
    }
    fs::write(&path, "a OK\nb SPAM\nc maybe\n").unwrap();
    let message = read_classification_from_file(&path).unwrap_err().to_string();
    assert!(message.contains("line 3"), "{message}");
}

#[test]
fn test_prediction_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(PREDICTION_FILE);
    let predictions = BTreeMap::from([
        ("b.eml".to_string(), Label::Spam),
        ("a.eml".to_string(), Label::Ham),
    ]);
    write_classification_to_file(&predictions, &path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "a.eml OK\nb.eml SPAM\n");
    assert_eq!(read_classification_from_file(&path).unwrap(), predictions);
}

#[test]
fn test_list_messages() {
    let dir = TempDir::new().unwrap();
    for name in ["2.eml", "1.eml", TRUTH_FILE, PREDICTION_FILE] {
        fs::write(dir.path().join(name), "Subject: x\r\n\r\nbody\r\n").unwrap();
    }
    fs::create_dir(dir.path().join("subdir")).unwrap();
    assert_eq!(list_messages(dir.path()).unwrap(), ["1.eml", "2.eml"]);
}

#[test]
fn test_list_missing_dir() {
    let dir = TempDir::new().unwrap();
    let r = list_messages(&dir.path().join("absent"));
    assert!(matches!(r, Err(Error::Io { .. })));
}
