use crate::config::CollectionSettings;
use crate::models::{Donation, FoodMatch, FoodRequest, Ngo};
use crate::services::store::{Document, DocumentStore, StoreError};
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Kinds of records kept in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Donations,
    Requests,
    Volunteers,
    Ngos,
    Matches,
}

impl RecordKind {
    /// Human label used in error messages ("Donation not found")
    pub fn singular(&self) -> &'static str {
        match self {
            RecordKind::Donations => "Donation",
            RecordKind::Requests => "Request",
            RecordKind::Volunteers => "Volunteer",
            RecordKind::Ngos => "NGO",
            RecordKind::Matches => "Match",
        }
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "donations" => Ok(RecordKind::Donations),
            "requests" => Ok(RecordKind::Requests),
            "volunteers" => Ok(RecordKind::Volunteers),
            "ngos" => Ok(RecordKind::Ngos),
            "matches" => Ok(RecordKind::Matches),
            other => Err(format!("unknown record kind {:?}", other)),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

/// Typed access to the Zero Hunger collections
///
/// Wraps any [`DocumentStore`] and converts between documents and domain
/// models. Documents that fail to decode are skipped in listings with a
/// warning rather than failing the whole read.
#[derive(Clone)]
pub struct FoodRepository {
    store: Arc<dyn DocumentStore>,
    collections: CollectionSettings,
}

impl FoodRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collections: CollectionSettings) -> Self {
        Self { store, collections }
    }

    pub fn collection(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Donations => &self.collections.donations,
            RecordKind::Requests => &self.collections.requests,
            RecordKind::Volunteers => &self.collections.volunteers,
            RecordKind::Ngos => &self.collections.ngos,
            RecordKind::Matches => &self.collections.matches,
        }
    }

    pub async fn get_donation(&self, id: &str) -> Result<Option<Donation>, StoreError> {
        self.get(RecordKind::Donations, id).await
    }

    /// Every request still waiting for food
    ///
    /// Unlike listings this never drops a record: a pending request that
    /// cannot be decoded fails the whole read.
    pub async fn pending_requests(&self) -> Result<Vec<FoodRequest>, StoreError> {
        let collection = self.collection(RecordKind::Requests);
        let docs = self
            .store
            .query_by_field(collection, "status", &Value::String("pending".to_string()))
            .await?;

        docs.into_iter()
            .map(|doc| {
                let id = doc.get("id").cloned().unwrap_or(Value::Null);
                serde_json::from_value(Value::Object(doc)).map_err(|e| {
                    StoreError::InvalidResponse(format!("Failed to parse pending request {}: {}", id, e))
                })
            })
            .collect()
    }

    pub async fn list_ngos(&self) -> Result<Vec<Ngo>, StoreError> {
        self.list(RecordKind::Ngos).await
    }

    /// Persist each match as a new record
    ///
    /// Inserts run concurrently. The first failure fails the whole call;
    /// inserts that already completed are not undone.
    pub async fn insert_matches(&self, matches: Vec<FoodMatch>) -> Result<Vec<FoodMatch>, StoreError> {
        let collection = self.collection(RecordKind::Matches);

        let documents = matches
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;

        let ids = try_join_all(
            documents
                .into_iter()
                .map(|doc| self.store.insert(collection, doc)),
        )
        .await?;

        Ok(matches
            .into_iter()
            .zip(ids)
            .map(|(mut m, id)| {
                m.id = Some(id);
                m
            })
            .collect())
    }

    /// Store a new record and return its id
    pub async fn create<T: Serialize>(&self, kind: RecordKind, record: &T) -> Result<String, StoreError> {
        let collection = self.collection(kind);
        let id = self.store.insert(collection, to_document(record)?).await?;
        tracing::debug!("Created {} {}", kind, id);
        Ok(id)
    }

    /// Set the `status` field of a record; `false` when the id is unknown
    pub async fn update_status(&self, kind: RecordKind, id: &str, status: &str) -> Result<bool, StoreError> {
        let mut fields = Document::new();
        fields.insert("status".to_string(), Value::String(status.to_string()));
        self.store.update_fields(self.collection(kind), id, fields).await
    }

    pub async fn get<T: DeserializeOwned>(&self, kind: RecordKind, id: &str) -> Result<Option<T>, StoreError> {
        let collection = self.collection(kind);
        match self.store.get_by_id(collection, id).await? {
            Some(doc) => serde_json::from_value(Value::Object(doc))
                .map(Some)
                .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse {} {}: {}", kind, id, e))),
            None => Ok(None),
        }
    }

    pub async fn list<T: DeserializeOwned>(&self, kind: RecordKind) -> Result<Vec<T>, StoreError> {
        let collection = self.collection(kind);
        let docs = self.store.list(collection).await?;
        Ok(decode_all(collection, docs))
    }

    /// Raw documents of a collection, as stored
    pub async fn list_documents(&self, kind: RecordKind) -> Result<Vec<Document>, StoreError> {
        self.store.list(self.collection(kind)).await
    }

    pub async fn get_document(&self, kind: RecordKind, id: &str) -> Result<Option<Document>, StoreError> {
        self.store.get_by_id(self.collection(kind), id).await
    }
}

/// Serialize a record for storage, leaving the id to the store
fn to_document<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(mut doc) => {
            doc.remove("id");
            Ok(doc)
        }
        other => Err(StoreError::InvalidResponse(format!(
            "Expected a JSON object to store, got {}",
            other
        ))),
    }
}

fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| {
            let id = doc.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(Value::Object(doc)) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed document {} in {}: {}", id, collection, e);
                    None
                }
            }
        })
        .collect()
}
