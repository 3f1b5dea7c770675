//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for meshkit_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => meshkit_core::Error::Io(e),
            IoError::FileNotFound { path } => meshkit_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {path}"),
            )),
            IoError::InvalidFormat { format } => meshkit_core::Error::UnsupportedFormat(format),
            e @ IoError::ParseError { .. } => meshkit_core::Error::InvalidData(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_core_error() {
        let err: meshkit_core::Error = IoError::ParseError {
            line: 3,
            message: "expected 3 values".to_string(),
        }
        .into();
        assert!(matches!(err, meshkit_core::Error::InvalidData(ref m) if m.contains("line 3")));

        let err: meshkit_core::Error = IoError::FileNotFound {
            path: "missing.off".to_string(),
        }
        .into();
        assert!(matches!(err, meshkit_core::Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
