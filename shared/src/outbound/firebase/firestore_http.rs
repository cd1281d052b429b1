//! Reqwest-backed Firestore adapter.
//!
//! Talks to the Firestore REST v1 API. Writes use `PATCH` without an update
//! mask so each `set` replaces the whole document. Equality queries go
//! through `:runQuery`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use super::FirebaseSession;
use super::firestore_value::{decode_fields, encode_fields, encode_value};
use crate::domain::ports::{Document, DocumentStore, DocumentStoreError, FieldFilter};
use crate::outbound::http_support::status_message;

/// Public Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

const LIST_PAGE_SIZE: &str = "300";

/// Document store backed by the Firestore REST API.
pub struct FirestoreHttpStore {
    client: Client,
    base_url: Url,
    project_id: String,
    session: FirebaseSession,
}

#[derive(Debug, Deserialize)]
struct DocumentDto {
    name: String,
    #[serde(default)]
    fields: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsDto {
    #[serde(default)]
    documents: Vec<DocumentDto>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryRowDto {
    #[serde(default)]
    document: Option<DocumentDto>,
}

impl FirestoreHttpStore {
    /// Build a store for `project_id` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        project_id: impl Into<String>,
        timeout: Duration,
        session: FirebaseSession,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            project_id: project_id.into(),
            session,
        })
    }

    fn url(&self, tail: &[&str]) -> Result<Url, DocumentStoreError> {
        documents_url(&self.base_url, &self.project_id, tail)
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.id_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<(StatusCode, Vec<u8>), DocumentStoreError> {
        let response = self
            .authorised(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(operation, status = status.as_u16(), "firestore call completed");
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreHttpStore {
    fn new_document_id(&self, _collection: &str) -> String {
        Uuid::new_v4().simple().to_string()
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentStoreError> {
        let url = self.url(&[collection, id])?;
        let (status, body) = self.execute(self.client.get(url), "get").await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        ensure_success(status, &body)?;
        let dto: DocumentDto = parse_body(&body)?;
        to_document(dto).map(Some)
    }

    async fn set(&self, collection: &str, id: &str, fields: &Value) -> Result<(), DocumentStoreError> {
        let url = self.url(&[collection, id])?;
        let body = json!({ "fields": encode_fields(fields)? });
        let (status, response) = self
            .execute(self.client.patch(url).json(&body), "set")
            .await?;
        ensure_success(status, &response)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DocumentStoreError> {
        let url = self.url(&[collection, id])?;
        let (status, body) = self.execute(self.client.delete(url), "delete").await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(status, &body)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentStoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = self.url(&[collection])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            let (status, body) = self.execute(self.client.get(url), "list").await?;
            ensure_success(status, &body)?;
            let page: ListDocumentsDto = parse_body(&body)?;
            for dto in page.documents {
                documents.push(to_document(dto)?);
            }
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(documents),
            }
        }
    }

    async fn find_equal(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let url = run_query_url(self.url(&[])?);
        let body = structured_query(collection, filters);
        let (status, response) = self
            .execute(self.client.post(url).json(&body), "run_query")
            .await?;
        ensure_success(status, &response)?;
        let rows: Vec<RunQueryRowDto> = parse_body(&response)?;
        rows.into_iter()
            .filter_map(|row| row.document)
            .map(to_document)
            .collect()
    }
}

fn documents_url(base: &Url, project_id: &str, tail: &[&str]) -> Result<Url, DocumentStoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DocumentStoreError::connection(format!("invalid firestore url: {base}")))?
        .pop_if_empty()
        .extend(["projects", project_id, "databases", "(default)", "documents"])
        .extend(tail);
    Ok(url)
}

fn run_query_url(mut documents: Url) -> Url {
    let path = format!("{}:runQuery", documents.path());
    documents.set_path(&path);
    documents
}

fn structured_query(collection: &str, filters: &[FieldFilter]) -> Value {
    let mut query = json!({ "from": [{ "collectionId": collection }] });
    let mut clauses: Vec<Value> = filters
        .iter()
        .map(|filter| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": filter.field },
                    "op": "EQUAL",
                    "value": encode_value(&filter.value),
                }
            })
        })
        .collect();
    let predicate = match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(json!({ "compositeFilter": { "op": "AND", "filters": clauses } })),
    };
    if let (Some(predicate), Some(object)) = (predicate, query.as_object_mut()) {
        object.insert("where".to_owned(), predicate);
    }
    json!({ "structuredQuery": query })
}

fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn to_document(dto: DocumentDto) -> Result<Document, DocumentStoreError> {
    Ok(Document {
        id: document_id(&dto.name).to_owned(),
        fields: decode_fields(dto.fields.as_ref())?,
    })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, DocumentStoreError> {
    serde_json::from_slice(body)
        .map_err(|error| DocumentStoreError::decode(format!("invalid firestore response: {error}")))
}

fn ensure_success(status: StatusCode, body: &[u8]) -> Result<(), DocumentStoreError> {
    if status.is_success() {
        return Ok(());
    }
    let error = map_status_error(status, body);
    debug!(%error, "firestore call failed");
    Err(error)
}

fn map_transport_error(error: reqwest::Error) -> DocumentStoreError {
    DocumentStoreError::connection(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DocumentStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DocumentStoreError::permission_denied(message)
        }
        status if status.is_server_error() => DocumentStoreError::connection(message),
        _ => DocumentStoreError::query(message),
    }
}
