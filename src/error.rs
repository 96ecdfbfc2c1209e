use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {reason}", path.display())]
    CorpusFormat { path: PathBuf, reason: String },

    #[error("cannot parse message {name}")]
    MessageParse { name: String },

    #[error("training corpus needs both classes, got {spam} spam and {ham} ham messages")]
    DegenerateCorpus { spam: usize, ham: usize },

    #[error("filter used before training")]
    UntrainedUse,
}

impl Error {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corpus_format(path: &Path, reason: impl Into<String>) -> Self {
        Error::CorpusFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
