//! Flat-file corpus layout: one directory of messages plus label files.

use crate::{Error, Label, Predictions, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write as _};
use std::path::Path;
use tracing::warn;

pub const TRUTH_FILE: &str = "!truth.txt";
pub const PREDICTION_FILE: &str = "!prediction.txt";

/// Reads `<filename> <label>` lines. Blank lines are skipped.
pub fn read_classification_from_file(path: &Path) -> Result<BTreeMap<String, Label>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::corpus_format(path, "label file missing"),
        _ => Error::io(path, e),
    })?;
    let mut labels = BTreeMap::new();
    for (index, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let (name, label) = match fields[..] {
            [] => continue,
            [name, label] => (name, label),
            _ => {
                return Err(Error::corpus_format(
                    path,
                    format!("line {}: expected `<filename> <label>`", index + 1),
                ));
            }
        };
        let label: Label = label
            .parse()
            .map_err(|e| Error::corpus_format(path, format!("line {}: {e}", index + 1)))?;
        if labels.insert(name.to_string(), label).is_some() {
            warn!(file = name, "duplicate entry in label file, last one wins");
        }
    }
    Ok(labels)
}

pub fn write_classification_to_file(predictions: &Predictions, path: &Path) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        for (name, label) in predictions {
            writeln!(out, "{name} {label}")?;
        }
        out.flush()
    };
    write().map_err(|e| Error::io(path, e))
}

/// Names of the message files in `dir`, sorted.
///
/// Files starting with `!` are corpus metadata and never messages.
pub fn list_messages(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with('!') => (),
            Ok(name) => names.push(name),
            Err(name) => warn!(file = ?name, "skipping file with non-UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}
