//! MongoDB Atlas Data API client — the only path from this service to the
//! document database. Handlers talk to the `DocumentStore` trait so tests can
//! swap in an in-memory fake.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::AtlasSettings;

pub const DATA_SOURCE: &str = "Cluster0";
pub const DATABASE_NAME: &str = "pathfinder_ai";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const SESSIONS: &str = "machine_coding_sessions";
pub const QUESTIONS: &str = "machine_coding_questions";
pub const SUBMISSIONS: &str = "machine_coding_submissions";

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Atlas API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the id Atlas assigned to the new document.
    async fn insert_one(&self, collection: &str, document: Value) -> Result<Value, AtlasError>;

    async fn insert_many(&self, collection: &str, documents: Vec<Value>)
        -> Result<usize, AtlasError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<(), AtlasError>;

    async fn find(
        &self,
        collection: &str,
        filter: Value,
        sort: Option<Value>,
    ) -> Result<Vec<Value>, AtlasError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertOneResult {
    #[serde(default)]
    inserted_id: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertManyResult {
    #[serde(default)]
    inserted_ids: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct FindResult {
    #[serde(default)]
    documents: Option<Vec<Value>>,
}

#[derive(Clone)]
pub struct AtlasClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AtlasClient {
    pub fn new(settings: &AtlasSettings) -> Result<Self, AtlasError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Calls `POST {base}/action/{action}` and returns the raw JSON response.
    async fn call(&self, action: &str, collection: &str, payload: Value) -> Result<Value, AtlasError> {
        let url = format!("{}/action/{action}", self.base_url);
        let body = action_body(collection, payload);

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("apiKey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Atlas API {action} error: {e}");
                AtlasError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Atlas API {action} error: {status} {message}");
            return Err(AtlasError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Atlas API {action} on {collection} succeeded");
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentStore for AtlasClient {
    async fn insert_one(&self, collection: &str, document: Value) -> Result<Value, AtlasError> {
        let raw = self
            .call("insertOne", collection, json!({ "document": document }))
            .await?;
        let result: InsertOneResult = serde_json::from_value(raw).unwrap_or(InsertOneResult {
            inserted_id: Value::Null,
        });
        Ok(result.inserted_id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<usize, AtlasError> {
        let sent = documents.len();
        let raw = self
            .call("insertMany", collection, json!({ "documents": documents }))
            .await?;
        Ok(serde_json::from_value::<InsertManyResult>(raw)
            .map(|r| r.inserted_ids.len())
            .unwrap_or(sent))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<(), AtlasError> {
        self.call(
            "updateOne",
            collection,
            json!({ "filter": filter, "update": update }),
        )
        .await?;
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Value,
        sort: Option<Value>,
    ) -> Result<Vec<Value>, AtlasError> {
        let mut payload = json!({ "filter": filter });
        if let Some(sort) = sort {
            payload["sort"] = sort;
        }
        let raw = self.call("find", collection, payload).await?;
        Ok(serde_json::from_value::<FindResult>(raw)
            .ok()
            .and_then(|r| r.documents)
            .unwrap_or_default())
    }
}

/// Builds the Data API request body: routing fields first, then the
/// action-specific payload merged in at the top level.
fn action_body(collection: &str, payload: Value) -> Value {
    let mut body = Map::new();
    body.insert("dataSource".to_string(), json!(DATA_SOURCE));
    body.insert("database".to_string(), json!(DATABASE_NAME));
    body.insert("collection".to_string(), json!(collection));
    if let Value::Object(fields) = payload {
        body.extend(fields);
    }
    Value::Object(body)
}
