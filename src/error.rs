use std::io;

use crate::encoding::EncodingError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Window type name that does not map to a known kind.
    #[error("Unsupported window type: {0}")]
    UnsupportedWindowType(String),

    /// Join windows are keyed by side; the side was not supplied.
    #[error("Join window requires a join type")]
    MissingJoinType,

    #[error("Window kind mismatch: expected {expected}, found {found}")]
    WindowKindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A store failure, labelled with the storage operation that raised it.
    #[error("{op} failed: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// True for errors caused by a bad window configuration. These are never
    /// worth retrying.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::UnsupportedWindowType(_)
            | Error::MissingJoinType
            | Error::WindowKindMismatch { .. } => true,
            Error::Operation { source, .. } => source.is_config_error(),
            _ => false,
        }
    }
}

/// Attaches an operation label to store failures.
pub trait ResultExt<T> {
    fn op(self, op: &'static str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn op(self, op: &'static str) -> Result<T> {
        self.map_err(|err| match err {
            // Configuration errors surface as-is; wrapping already-labelled
            // errors would only stack labels.
            err @ (Error::UnsupportedWindowType(_)
            | Error::MissingJoinType
            | Error::WindowKindMismatch { .. }
            | Error::Operation { .. }) => err,
            err => Error::Operation {
                op,
                source: Box::new(err),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_wraps_store_failures() {
        let result: Result<()> = Err(io::Error::new(io::ErrorKind::Other, "disk gone").into());
        let err = result.op("put_window_instance").unwrap_err();

        match &err {
            Error::Operation { op, source } => {
                assert_eq!(*op, "put_window_instance");
                assert!(matches!(**source, Error::Io(_)));
            }
            other => panic!("Expected Operation error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "put_window_instance failed: I/O error: disk gone");
    }

    #[test]
    fn test_op_does_not_wrap_config_errors() {
        let result: Result<()> = Err(Error::MissingJoinType);
        let err = result.op("put_window_base_value").unwrap_err();
        assert!(matches!(err, Error::MissingJoinType));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_op_does_not_stack_labels() {
        let result: Result<()> = Err(Error::Encoding(EncodingError::TruncatedData));
        let err = result.op("inner").op("outer").unwrap_err();
        match err {
            Error::Operation { op, .. } => assert_eq!(op, "inner"),
            other => panic!("Expected Operation error, got {:?}", other),
        }
    }
}
