use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassdexError {
    #[error(
        "could not create a container for {location}: no matching url type was found. \
         register a custom UrlType with UrlTypes::prepend or replace the list with UrlTypes::replace"
    )]
    NoMatchingContainerType { location: String },
    #[error("could not open {location} using {url_type}: {reason}")]
    UnreadableContainer {
        location: String,
        url_type: String,
        reason: String,
    },
    #[error("malformed artifact {entry}: {reason}")]
    MalformedArtifact { entry: String, reason: String },
    #[error("scanner {scanner} failed on {entry}: {reason}")]
    ScanTaskFailure {
        entry: String,
        scanner: String,
        reason: String,
    },
    #[error("no locations configured for scanning")]
    EmptyLocationSet,
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("unknown scanner: {0}")]
    UnknownScanner(String),
    #[error("could not build worker pool: {0}")]
    Executor(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ClassdexError {
    fn from(err: serde_json::Error) -> Self {
        ClassdexError::Serialization(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for ClassdexError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        ClassdexError::Executor(err.to_string())
    }
}

impl From<regex::Error> for ClassdexError {
    fn from(err: regex::Error) -> Self {
        ClassdexError::InvalidFilter(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClassdexError>;
