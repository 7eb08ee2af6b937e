//! Reader contract injected into the scan pipeline.

use crate::descriptor::ClassDescriptor;
use thiserror::Error;

/// Error type for collaborator-supplied callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes are not a recognizable compiled artifact
    #[error("malformed artifact: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns the raw bytes of one entry into a [`ClassDescriptor`].
///
/// Implementations must not resolve the artifact's enclosing type system:
/// every name in the descriptor is taken from the bytes alone.
pub trait ArtifactParser: Send + Sync {
    /// Parser name (for logging)
    fn name(&self) -> &str;

    fn parse(&self, bytes: &[u8]) -> Result<ClassDescriptor, ParseError>;
}
