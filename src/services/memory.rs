use crate::services::store::{Document, DocumentStore, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process document store
///
/// Used in development (seeded with fixtures) and in tests. Documents keep
/// their insertion order within a collection, so listings are stable.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, Document)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document under a fixed id
    pub async fn put(&self, collection: &str, id: &str, mut document: Document) {
        document.remove("id");
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, slot)) => *slot = document,
            None => docs.push((id.to_string(), document)),
        }
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn with_id(id: &str, document: &Document) -> Document {
    let mut out = document.clone();
    out.insert("id".to_string(), Value::String(id.to_string()));
    out
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(doc_id, doc)| with_id(doc_id, doc)))
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| doc.get(field) == Some(value))
                    .map(|(doc_id, doc)| with_id(doc_id, doc))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().map(|(doc_id, doc)| with_id(doc_id, doc)).collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        document.remove("id");

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push((id.clone(), document));

        tracing::debug!("Inserted document {} into {}", id, collection);
        Ok(id)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc)
        else {
            return Ok(false);
        };

        for (key, value) in fields {
            if key != "id" {
                doc.insert(key, value);
            }
        }
        Ok(true)
    }
}
