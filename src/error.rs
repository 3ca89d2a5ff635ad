//! Error types for mogreps-ingest.
//!
//! Every failure in a run propagates to the top level as an [`IngestError`].
//! The binary maps [`IngestError::SourceNotFound`] to exit code 1 and every
//! other variant to a generic failure.

use thiserror::Error;

/// The main error type for ingest operations.
#[derive(Error, Debug)]
pub enum IngestError {
    /// No object in the source bucket matches the configured prefix
    #[error("No source file found in bucket {bucket} with prefix {prefix}")]
    SourceNotFound { bucket: String, prefix: String },

    /// A variable lacks an attribute the metadata contract requires
    #[error("Variable {variable} is missing required attribute {attribute}")]
    MetadataMissing { variable: String, attribute: String },

    /// Object store listing, download or upload failure
    #[error("Storage error during {operation} of {key}: {message}")]
    Storage {
        operation: String,
        key: String,
        message: String,
    },

    /// The inspected dimensions did not provide every extent key
    #[error("Extent incomplete, missing: {}", .missing.join(", "))]
    ExtentIncomplete { missing: Vec<String> },

    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },
}

impl IngestError {
    pub(crate) fn storage(operation: &str, key: &str, err: impl std::fmt::Display) -> Self {
        IngestError::Storage {
            operation: operation.to_string(),
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn missing(variable: &str, attribute: &str) -> Self {
        IngestError::MetadataMissing {
            variable: variable.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Convenience type alias for Results with IngestError
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = IngestError::missing("air_temperature", "units");
        assert_eq!(
            err.to_string(),
            "Variable air_temperature is missing required attribute units"
        );

        let err = IngestError::storage("download", "prods_op.nc", "connection reset");
        assert_eq!(
            err.to_string(),
            "Storage error during download of prods_op.nc: connection reset"
        );

        let err = IngestError::ExtentIncomplete {
            missing: vec!["start".to_string(), "end".to_string()],
        };
        assert_eq!(err.to_string(), "Extent incomplete, missing: start, end");
    }
}
