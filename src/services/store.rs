use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record: field name to JSON value, with the record id under `id`
pub type Document = Map<String, Value>;

/// Errors that can occur when talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Store returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid or expired access token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Narrow document-store contract used by the repository
///
/// Collections are addressed by name. Documents handed back always carry
/// their identifier in the `id` field; documents handed in must not.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Every document whose `field` equals `value`
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Append a new document and return its generated id
    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    /// Overwrite the given fields of an existing document
    ///
    /// Returns `false` when no document has that id.
    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError>;
}
