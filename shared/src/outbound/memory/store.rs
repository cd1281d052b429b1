//! `BTreeMap`-backed document store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{Document, DocumentStore, DocumentStoreError, FieldFilter};

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// Document store holding every collection in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<Collections>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, DocumentStoreError> {
        self.collections
            .lock()
            .map_err(|_| DocumentStoreError::connection("in-memory store poisoned"))
    }

    fn documents_matching(
        &self,
        collection: &str,
        keep: impl Fn(&Value) -> bool,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_, fields)| keep(fields))
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn new_document_id(&self, _collection: &str) -> String {
        Uuid::new_v4().simple().to_string()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentStoreError> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| Document {
                id: id.to_owned(),
                fields: fields.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, fields: &Value) -> Result<(), DocumentStoreError> {
        if !fields.is_object() {
            return Err(DocumentStoreError::query(format!(
                "document '{collection}/{id}' must be a JSON object"
            )));
        }
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError> {
        let mut collections = self.lock()?;
        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        self.documents_matching(collection, |_| true)
    }

    async fn find_equal(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, DocumentStoreError> {
        self.documents_matching(collection, |fields| {
            filters.iter().all(|filter| filter.matches(fields))
        })
    }
}
