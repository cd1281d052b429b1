//! Driven port for the document database (Firestore in production).
//!
//! Documents travel as JSON objects so the domain never sees the store's
//! wire encoding. Writes are full replacements keyed by document id.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::define_port_error;

/// Collection holding one profile per auth UID.
pub const USERS_COLLECTION: &str = "Users";
/// Collection holding every dog, keyed by generated id.
pub const DOGS_COLLECTION: &str = "Dogs";
/// Shared collection of dog parks, keyed by place id or generated id.
pub const DOG_GARDENS_COLLECTION: &str = "DogGardens";

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// Store could not be reached.
        Connection { message: String } =>
            "document store connection failed: {message}",
        /// Read, write or query failed during execution.
        Query { message: String } =>
            "document store query failed: {message}",
        /// Caller lacks permission for the document.
        PermissionDenied { message: String } =>
            "document store permission denied: {message}",
        /// Stored document did not match the expected shape.
        Decode { message: String } =>
            "document decode failed: {message}",
    }
}

/// A stored document and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    /// Document body as a JSON object.
    pub fields: Value,
}

impl Document {
    /// Decode the body into a DTO.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DocumentStoreError> {
        serde_json::from_value(self.fields.clone()).map_err(|error| {
            DocumentStoreError::decode(format!("document '{}': {error}", self.id))
        })
    }
}

/// Equality predicate on one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    /// Field path.
    pub field: String,
    /// Value the field must equal.
    pub value: Value,
}

impl FieldFilter {
    /// Build an equality filter.
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Return whether `fields` satisfies the filter.
    pub fn matches(&self, fields: &Value) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// Collection-oriented document storage.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Produce a fresh document id for `collection` without writing anything.
    fn new_document_id(&self, collection: &str) -> String;

    /// Fetch one document, `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentStoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, fields: &Value) -> Result<(), DocumentStoreError>;

    /// Delete a document; deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError>;

    /// Fetch every document in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError>;

    /// Fetch documents matching all `filters`.
    async fn find_equal(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, DocumentStoreError>;
}
