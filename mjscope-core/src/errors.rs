use thiserror::Error;

#[derive(Debug, Error)]
pub enum MjscopeError {
    /// Record does not have the fixed layout length.
    #[error("invalid record length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A record inside a batch failed to decode.
    #[error("record {index} failed to decode: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: Box<MjscopeError>,
    },

    /// Pairwise or consolidated comparison requested on too few snapshots.
    #[error("insufficient data: need at least {required} snapshots, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Zero records where at least one is required.
    #[error("empty input: at least one record is required")]
    EmptyInput,

    /// Configuration rejected at construction time.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// JSON rendering or parsing failure at the output boundary.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The dedicated decode pool could not be built.
    #[error("thread pool error: {message}")]
    ThreadPool { message: String },
}

pub type MjscopeResult<T> = Result<T, MjscopeError>;

impl From<serde_json::Error> for MjscopeError {
    fn from(err: serde_json::Error) -> Self {
        MjscopeError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_length_message() {
        let err = MjscopeError::InvalidLength {
            expected: 510,
            actual: 509,
        };
        assert_eq!(
            err.to_string(),
            "invalid record length: expected 510, got 509"
        );
    }

    #[test]
    fn invalid_record_exposes_source() {
        use std::error::Error as _;
        let err = MjscopeError::InvalidRecord {
            index: 3,
            source: Box::new(MjscopeError::InvalidLength {
                expected: 510,
                actual: 0,
            }),
        };
        assert!(err.to_string().starts_with("record 3 failed to decode"));
        assert!(err.source().is_some());
    }
}
