//! Error types and result types for document store operations.
//!
//! Every fallible storage call returns [`DocumentStoreResult<T>`]. Callers above the
//! storage layer are expected to wrap these errors with their own context rather than
//! match on individual variants.

use bson::error::Error as BsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// A document could not be converted between its Rust shape and BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The backend could not be created or could not reach its server.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The stored value is not a document, or a query referenced it in an unsupported way.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A query used an operator with a value the backend cannot evaluate.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = DocumentStoreError::Backend("connection reset".to_string());
        assert_eq!(err.to_string(), "Backend error: connection reset");
    }

    #[test]
    fn test_bson_error_converts_to_serialization() {
        let err: DocumentStoreError = bson::de::deserialize_from_bson::<u32>(bson::Bson::String("nope".to_string()))
            .unwrap_err()
            .into();
        assert!(matches!(err, DocumentStoreError::Serialization(_)));
    }
}
