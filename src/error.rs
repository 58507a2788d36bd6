use std::fmt;
use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Which parallel parameter list disagreed with the binding slots of a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    /// Discovered parameter names
    Names,
    /// Declared parameter types
    Types,
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetadataKind::Names => write!(f, "parameter names"),
            MetadataKind::Types => write!(f, "parameter types"),
        }
    }
}

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    ParseError { file: PathBuf, message: String },
    ManifestError { file: PathBuf, message: String },
    InvalidArgument(String),
    /// The binding slots of a handler do not line up with its names or types
    ParameterMetadataMismatch {
        handler: String,
        kind: MetadataKind,
        expected: usize,
        actual: usize,
    },
    SerializationError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ParseError { file, message } => {
                write!(f, "parse error in {}: {}", file.display(), message)
            }
            Error::ManifestError { file, message } => {
                write!(f, "invalid route manifest {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::ParameterMetadataMismatch {
                handler,
                kind,
                expected,
                actual,
            } => write!(
                f,
                "handler '{}' has {} parameter binding slots but {} {}",
                handler, expected, actual, kind
            ),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

impl From<syn::Error> for Error {
    fn from(err: syn::Error) -> Self {
        Error::ParseError {
            file: PathBuf::from("<unknown>"),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_names_counts() {
        let err = Error::ParameterMetadataMismatch {
            handler: "users::get_user".to_string(),
            kind: MetadataKind::Names,
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "handler 'users::get_user' has 2 parameter binding slots but 1 parameter names"
        );
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
    }
}
