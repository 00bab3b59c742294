//! Error types for the VM manager

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for VM manager operations
pub type Result<T> = std::result::Result<T, VmError>;

#[derive(Error, Debug)]
pub enum VmError {
    /// A file could not be opened, read or written
    #[error("IO error on {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing store does not hold exactly 256 pages
    #[error("Backing store must be {expected} bytes, found {actual}")]
    BackingStoreSize { expected: usize, actual: usize },

    /// Virtual address outside the 16-bit address space
    #[error("Invalid virtual address: {0} (max 65535)")]
    InvalidAddress(u32),

    /// Address file line that is not a non-negative integer
    #[error("Malformed address on line {line}: {text:?}")]
    MalformedAddress { line: usize, text: String },

    /// Page fault with every frame in use and no replacement policy
    #[error("No free frame for page {page}: physical memory exhausted, replacement not enabled")]
    FramesExhausted { page: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VmError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        VmError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Io { .. } => 3,
            Self::BackingStoreSize { .. } => 4,
            Self::InvalidAddress(_) | Self::MalformedAddress { .. } => 5,
            Self::FramesExhausted { .. } => 6,
            Self::InvalidConfig(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VmError::InvalidAddress(70000);
        assert!(err.to_string().contains("70000"));

        let err = VmError::MalformedAddress {
            line: 3,
            text: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("abc"));

        let err = VmError::FramesExhausted { page: 200 };
        assert!(err.to_string().contains("page 200"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error;

        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = VmError::io("BACKING_STORE.bin", source);
        assert!(err.to_string().contains("BACKING_STORE.bin"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let exhausted = VmError::FramesExhausted { page: 1 };
        let invalid = VmError::InvalidAddress(1 << 20);
        assert_ne!(exhausted.exit_code(), invalid.exit_code());
    }
}
