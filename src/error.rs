//! Error enum
use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Csv(csv::Error),
    Yaml(serde_yaml::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    InvalidBookNumber(usize),
    InvalidBookId(String),
    InvalidVerseRef(String),
    InvalidAlignment(String),
    InvalidAligner(String),
    Config(String),
    NoInverseModel,
    Custom(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Csv(e) => write!(f, "csv error: {}", e),
            Error::Yaml(e) => write!(f, "yaml error: {}", e),
            Error::Glob(e) => write!(f, "glob error: {}", e),
            Error::GlobPattern(e) => write!(f, "glob pattern error: {}", e),
            Error::InvalidBookNumber(n) => write!(f, "the book number {} is invalid", n),
            Error::InvalidBookId(id) => write!(f, "the book id {:?} is invalid", id),
            Error::InvalidVerseRef(s) => write!(f, "invalid verse reference {:?}", s),
            Error::InvalidAlignment(s) => write!(f, "invalid alignment {:?}", s),
            Error::InvalidAligner(s) => write!(f, "invalid aligner {:?}", s),
            Error::Config(s) => write!(f, "configuration error: {}", s),
            Error::NoInverseModel => write!(f, "the aligner does not have an inverse model"),
            Error::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        Error::Csv(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Error {
        Error::Yaml(e)
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
