// Error taxonomy shared by all scanners

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    Unsupported(String),

    #[error("Truncated read at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: u64,
        needed: usize,
        remaining: usize,
    },

    #[error("Offset {offset} out of range for {len} bytes")]
    OutOfRange { offset: usize, len: usize },

    #[error("Malformed data: {0}")]
    Malformed(String),
}

impl ScanError {
    /// Errors scoped to a single chunk, atom or block.
    ///
    /// These abandon the piece being parsed but never the whole scan.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScanError::Truncated { .. } | ScanError::OutOfRange { .. } | ScanError::Malformed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Swallow a recoverable error after logging it, propagate anything else.
pub(crate) fn recover<T>(result: Result<T>, context: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_recoverable() => {
            debug!(error = %e, "skipping {}", context);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
