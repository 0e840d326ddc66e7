use crate::services::store::{Document, DocumentStore, StoreError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Number, Value};
use std::time::Duration;

/// Firestore REST API client
///
/// Talks to the `v1` documents API of a single project/database. Firestore
/// wraps every value in a type tag (`{"stringValue": "..."}`); documents are
/// converted to and from plain JSON at this boundary so nothing else in the
/// service sees the tagged form.
pub struct FirestoreClient {
    base_url: String,
    project_id: String,
    database_id: String,
    access_token: Option<String>,
    client: Client,
}

impl FirestoreClient {
    /// Create a new Firestore client
    pub fn new(
        base_url: String,
        project_id: String,
        database_id: String,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            project_id,
            database_id,
            access_token,
            client,
        })
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database_id
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_root(),
            collection,
            urlencoding::encode(id)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Run a structured query over one collection, optionally filtered by
    /// field equality
    async fn run_query(&self, collection: &str, filter: Option<(&str, &Value)>) -> Result<Vec<Document>, StoreError> {
        let mut structured_query = json!({
            "from": [{ "collectionId": collection }],
        });

        if let Some((field, value)) = filter {
            structured_query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value),
                }
            });
        }

        let url = format!("{}:runQuery", self.documents_root());
        tracing::debug!("Querying Firestore collection {}", collection);

        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await?;

        let response = check_status(response, "run query").await?;
        let rows: Vec<Value> = response.json().await?;

        // Rows without a document only carry a read time
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(decode_document)
            .collect()
    }
}

async fn check_status(response: Response, action: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("Firestore failed to {}: {} - {}", action, status, body);
    Err(StoreError::ApiError(format!("Failed to {}: {}", action, status)))
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        tracing::debug!("Fetching document from: {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response, "fetch document").await?;
        let json: Value = response.json().await?;
        decode_document(&json).map(Some)
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.run_query(collection, Some((field, value))).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.run_query(collection, None).await
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        document.remove("id");
        let url = format!("{}/{}", self.documents_root(), collection);

        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "fields": encode_fields(&document) }))
            .send()
            .await?;

        let response = check_status(response, "create document").await?;
        let json: Value = response.json().await?;

        let id = json
            .get("name")
            .and_then(Value::as_str)
            .and_then(document_id)
            .ok_or_else(|| StoreError::InvalidResponse("Created document has no name".into()))?;

        tracing::debug!("Created document {} in {}", id, collection);
        Ok(id)
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        mut fields: Document,
    ) -> Result<bool, StoreError> {
        fields.remove("id");
        if fields.is_empty() {
            return Ok(self.get_by_id(collection, id).await?.is_some());
        }

        // Only the listed fields are written; the document must already exist
        let mask = fields
            .keys()
            .map(|key| format!("updateMask.fieldPaths={}", urlencoding::encode(key)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!(
            "{}?{}&currentDocument.exists=true",
            self.document_url(collection, id),
            mask
        );

        let response = self
            .authorize(self.client.patch(&url))
            .json(&json!({ "fields": encode_fields(&fields) }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response, "update document").await?;
        Ok(true)
    }
}

/// Last path segment of a document resource name
fn document_id(name: &str) -> Option<String> {
    name.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Convert a Firestore document resource into a plain document with `id`
pub fn decode_document(resource: &Value) -> Result<Document, StoreError> {
    let name = resource
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidResponse("Document is missing its name".into()))?;

    let mut document = Document::new();
    if let Some(fields) = resource.get("fields").and_then(Value::as_object) {
        for (key, value) in fields {
            document.insert(key.clone(), decode_value(value));
        }
    }

    if let Some(id) = document_id(name) {
        document.insert("id".to_string(), Value::String(id));
    }
    Ok(document)
}

/// Wrap every field of a plain document in Firestore value tags
pub fn encode_fields(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

/// Plain JSON to a Firestore typed value
///
/// Integers become `integerValue` (a decimal string on the wire), other
/// numbers `doubleValue`. Timestamps are stored as strings.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(0.0) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({
            "mapValue": { "fields": encode_fields(map) }
        }),
    }
}

/// Firestore typed value to plain JSON
///
/// Geo points come back as `{lat, lng}` to line up with the domain model.
/// Unknown tags decode to null.
pub fn decode_value(value: &Value) -> Value {
    let Some((tag, inner)) = value.as_object().and_then(|obj| obj.iter().next()) else {
        return Value::Null;
    };

    match tag.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            Value::Number(n) => Value::Number(n.clone()),
            _ => Value::Null,
        },
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => {
            // Zero coordinates are omitted on the wire
            let coord = |key: &str| inner.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            json!({ "lat": coord("latitude"), "lng": coord("longitude") })
        }
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(key, value)| (key.clone(), decode_value(value)))
                        .collect::<Map<String, Value>>()
                })
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}
