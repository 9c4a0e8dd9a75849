//! Error types for the young generation

use vm_osal::MemoryError;

/// Young-generation operation result type
pub type GcResult<T> = Result<T, GcError>;

/// Errors raised by the young generation
///
/// Exhausted bump allocation, clamped shrink requests and clamped balloon
/// sizes are expected outcomes and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum GcError {
    /// The host could not reserve the generation's address range
    #[error("out of address space: cannot reserve {requested} bytes")]
    OutOfAddressSpace {
        /// Requested reservation size
        requested: usize,
        /// Host failure
        #[source]
        source: MemoryError,
    },

    /// Committing or uncommitting backing memory failed; boundaries are unchanged
    #[error("cannot change committed size from {committed} to {requested} bytes")]
    CommitFailed {
        /// Committed size before the attempt
        committed: usize,
        /// Committed size that was requested
        requested: usize,
    },

    /// Invalid configuration
    #[error("Invalid young generation configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// A byte range was rejected
    #[error("invalid byte range [{start:#x}, {end:#x})")]
    InvalidRange {
        /// Range start
        start: usize,
        /// Range end (exclusive)
        end: usize,
    },

    /// The eden/from/to partition no longer matches the committed range
    #[error("space layout violation: {0}")]
    LayoutViolation(String),

    /// An elastic-memory request could not be understood
    #[error("invalid balloon request: {0}")]
    InvalidBalloonRequest(String),

    /// The balloon request source could not be opened or read
    #[error("balloon input {path}: {source}")]
    BalloonReader {
        /// Pipe or file path
        path: String,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A counter snapshot could not be encoded
    #[error("counter encoding error: {0}")]
    CounterEncoding(String),
}

impl GcError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a layout violation error
    pub fn layout_violation(msg: impl Into<String>) -> Self {
        Self::LayoutViolation(msg.into())
    }

    /// Create an invalid range error
    pub fn invalid_range(start: usize, end: usize) -> Self {
        Self::InvalidRange { start, end }
    }

    /// Whether the runtime can carry on after this error
    ///
    /// Only a failed reservation is fatal: there is no degraded mode without
    /// an address range.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::OutOfAddressSpace { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GcError::invalid_config("min_size exceeds max_size");
        assert!(err.to_string().contains("min_size exceeds max_size"));

        let err = GcError::invalid_range(0x2000, 0x1000);
        assert!(err.to_string().contains("0x2000"));
        assert!(err.to_string().contains("0x1000"));

        let err = GcError::CounterEncoding("key must be a string".into());
        assert!(err.to_string().starts_with("counter encoding error"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_recoverable() {
        let fatal = GcError::OutOfAddressSpace {
            requested: 1 << 30,
            source: MemoryError::InvalidSize(0),
        };
        assert!(!fatal.is_recoverable());

        let err = GcError::CommitFailed {
            committed: 4096,
            requested: 8192,
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("8192"));
    }
}
