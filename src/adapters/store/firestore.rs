//! Cloud document store backend
//!
//! Speaks the document store REST API: documents live under
//! `{base}/projects/{project}/databases/(default)/documents/{collection}` and carry
//! typed field values (`{"stringValue": ...}`, `{"doubleValue": ...}`). Every request
//! is authorized with the signed-in user's id token.

use super::http::{
    build_client, connection_error, ensure_success, join_segments, parse_base_url, read_json,
};
use super::RecordStore;
use crate::adapters::identity::Session;
use crate::config::StoreConfig;
use crate::domain::{
    AuthError, PatientFields, PatientId, PatientRecord, RegistryError, Result, StoreError,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Map, Value};
use tokio::sync::watch;
use url::Url;

/// Page size used when listing a collection
const LIST_PAGE_SIZE: &str = "300";

/// One collection of the document store
///
/// Shared by the record store and the identity provider (which keeps user roles
/// in a collection of its own).
#[derive(Clone)]
pub struct DocumentCollection {
    client: Client,
    collection_url: Url,
}

impl DocumentCollection {
    /// Address `collection` of `project_id` under `base_url`
    pub fn new(
        client: Client,
        base_url: &str,
        project_id: &str,
        collection: &str,
    ) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let collection_url = join_segments(
            &base,
            &[
                "projects",
                project_id,
                "databases",
                "(default)",
                "documents",
                collection,
            ],
        )?;
        Ok(Self {
            client,
            collection_url,
        })
    }

    fn document_url(&self, id: &str) -> Result<Url> {
        join_segments(&self.collection_url, &[id])
    }

    /// Every document in the collection, following page tokens
    pub async fn list_documents(&self, token: &str) -> Result<Vec<Value>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.collection_url.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(ref page) = page_token {
                    query.append_pair("pageToken", page);
                }
            }

            let resp = authorized(self.client.get(url), token)
                .send()
                .await
                .map_err(connection_error)?;
            let body = read_json(ensure_success(resp, None).await?).await?;

            if let Some(items) = body.get("documents").and_then(Value::as_array) {
                documents.extend(items.iter().cloned());
            }

            match body.get("nextPageToken").and_then(Value::as_str) {
                Some(next) if !next.is_empty() => page_token = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// One document by id
    pub async fn get_document(&self, id: &str, token: &str) -> Result<Value> {
        let resp = authorized(self.client.get(self.document_url(id)?), token)
            .send()
            .await
            .map_err(connection_error)?;
        read_json(ensure_success(resp, Some(id)).await?).await
    }

    /// Create a document; the store picks the id unless `document_id` is given
    pub async fn create_document(
        &self,
        fields: Map<String, Value>,
        document_id: Option<&str>,
        token: &str,
    ) -> Result<Value> {
        let mut url = self.collection_url.clone();
        if let Some(id) = document_id {
            url.query_pairs_mut().append_pair("documentId", id);
        }

        let resp = authorized(self.client.post(url), token)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(connection_error)?;
        read_json(ensure_success(resp, None).await?).await
    }

    /// Replace all fields of an existing document
    pub async fn replace_document(
        &self,
        id: &str,
        fields: Map<String, Value>,
        token: &str,
    ) -> Result<()> {
        let mut url = self.document_url(id)?;
        url.query_pairs_mut()
            .append_pair("currentDocument.exists", "true");

        let resp = authorized(self.client.patch(url), token)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(connection_error)?;
        ensure_success(resp, Some(id)).await?;
        Ok(())
    }

    /// Delete an existing document
    pub async fn delete_document(&self, id: &str, token: &str) -> Result<()> {
        let mut url = self.document_url(id)?;
        url.query_pairs_mut()
            .append_pair("currentDocument.exists", "true");

        let resp = authorized(self.client.delete(url), token)
            .send()
            .await
            .map_err(connection_error)?;
        ensure_success(resp, Some(id)).await?;
        Ok(())
    }
}

fn authorized(builder: RequestBuilder, token: &str) -> RequestBuilder {
    builder.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Record store backed by a document store collection
///
/// The id token is read from the session channel on every request, so a
/// sign-out takes effect immediately.
pub struct FirestoreRecordStore {
    documents: DocumentCollection,
    session: watch::Receiver<Option<Session>>,
}

impl FirestoreRecordStore {
    /// Create a store for the configured project and collection
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `project_id` is missing or the base URL
    /// is unusable.
    pub fn new(config: &StoreConfig, session: watch::Receiver<Option<Session>>) -> Result<Self> {
        let project_id = config.project_id.as_deref().ok_or_else(|| {
            RegistryError::Configuration("store.project_id is required".to_string())
        })?;
        let client = build_client(config.timeout_seconds, config.tls_verify)?;
        let documents =
            DocumentCollection::new(client, &config.base_url, project_id, &config.collection)?;

        Ok(Self { documents, session })
    }

    fn token(&self) -> Result<String> {
        self.session
            .borrow()
            .as_ref()
            .filter(|s| s.email_verified)
            .map(|s| s.bearer_token().to_string())
            .ok_or_else(|| AuthError::NotSignedIn.into())
    }
}

#[async_trait]
impl RecordStore for FirestoreRecordStore {
    async fn list(&self) -> Result<Vec<PatientRecord>> {
        let token = self.token()?;
        let documents = self.documents.list_documents(&token).await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in &documents {
            match decode_document(document).and_then(|v| PatientRecord::from_json(&v)) {
                Ok(record) => records.push(record),
                Err(reason) => tracing::warn!(%reason, "Skipping malformed patient document"),
            }
        }
        Ok(records)
    }

    async fn get(&self, id: &PatientId) -> Result<PatientRecord> {
        let token = self.token()?;
        let document = self.documents.get_document(id.as_str(), &token).await?;

        decode_document(&document)
            .and_then(|v| PatientRecord::from_json(&v))
            .map_err(|e| StoreError::InvalidResponse(e).into())
    }

    async fn create(&self, fields: &PatientFields) -> Result<PatientRecord> {
        let token = self.token()?;
        let document = self
            .documents
            .create_document(encode_patient(fields), None, &token)
            .await?;

        let id = document_id(&document).ok_or_else(|| {
            StoreError::InvalidResponse("created document has no name".to_string())
        })?;

        tracing::info!(patient_id = %id, "Patient record created");
        Ok(PatientRecord::new(id, fields.clone()))
    }

    async fn update(&self, id: &PatientId, fields: &PatientFields) -> Result<()> {
        let token = self.token()?;
        self.documents
            .replace_document(id.as_str(), encode_patient(fields), &token)
            .await?;

        tracing::info!(patient_id = %id, "Patient record updated");
        Ok(())
    }

    async fn delete(&self, id: &PatientId) -> Result<()> {
        let token = self.token()?;
        self.documents.delete_document(id.as_str(), &token).await?;

        tracing::info!(patient_id = %id, "Patient record deleted");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "firestore"
    }
}

/// Encodes patient fields as typed document values
pub fn encode_patient(fields: &PatientFields) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("name".to_string(), json!({ "stringValue": fields.name }));
    if let Some(date) = fields.birth_date {
        map.insert(
            "birthDate".to_string(),
            json!({ "stringValue": date.format(crate::domain::patient::DATE_FORMAT).to_string() }),
        );
    }
    if let Some(height) = fields.height {
        map.insert("height".to_string(), json!({ "doubleValue": height }));
    }
    if let Some(weight) = fields.weight {
        map.insert("weight".to_string(), json!({ "doubleValue": weight }));
    }
    map
}

/// Id of a document, taken from the last segment of its resource name
pub fn document_id(document: &Value) -> Option<PatientId> {
    document
        .get("name")
        .and_then(Value::as_str)
        .and_then(|name| name.rsplit('/').next())
        .and_then(|id| PatientId::new(id).ok())
}

/// Flattens a typed document into a plain JSON object with an `id` key
pub fn decode_document(document: &Value) -> std::result::Result<Value, String> {
    let id = document_id(document).ok_or_else(|| "document has no usable name".to_string())?;

    let mut out = match document.get("fields") {
        Some(Value::Object(fields)) => decode_fields(fields),
        None => Map::new(),
        Some(other) => return Err(format!("document {id} has malformed fields: {other}")),
    };
    out.insert("id".to_string(), Value::String(id.into_inner()));
    Ok(Value::Object(out))
}

fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode_value(value)))
        .collect()
}

fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = obj.get("stringValue") {
        return s.clone();
    }
    if let Some(d) = obj.get("doubleValue") {
        return d.clone();
    }
    if let Some(i) = obj.get("integerValue") {
        // 64-bit integers arrive as decimal strings
        return match i {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::Null),
            other => other.clone(),
        };
    }
    if let Some(b) = obj.get("booleanValue") {
        return b.clone();
    }
    if let Some(ts) = obj.get("timestampValue").and_then(Value::as_str) {
        // Keep the calendar date only
        return Value::String(ts.chars().take(10).collect());
    }
    if let Some(map) = obj.get("mapValue") {
        return match map.get("fields") {
            Some(Value::Object(fields)) => Value::Object(decode_fields(fields)),
            _ => Value::Object(Map::new()),
        };
    }
    if let Some(array) = obj.get("arrayValue") {
        let values = array
            .get("values")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(values);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::Role;
    use crate::config::{secret_string, StoreBackend};
    use chrono::NaiveDate;
    use mockito::Matcher;

    const COLLECTION_PATH: &str = "/projects/demo/databases/(default)/documents/patients";

    fn session(verified: bool) -> Session {
        Session {
            uid: "u1".to_string(),
            email: "doc@example.com".to_string(),
            email_verified: verified,
            role: Role::User,
            id_token: secret_string("tok-1".to_string()),
        }
    }

    fn store_for(
        server: &mockito::ServerGuard,
        session: Option<Session>,
    ) -> (FirestoreRecordStore, watch::Sender<Option<Session>>) {
        let config = StoreConfig {
            backend: StoreBackend::Firestore,
            base_url: server.url(),
            project_id: Some("demo".to_string()),
            timeout_seconds: 5,
            ..Default::default()
        };
        let (tx, rx) = watch::channel(session);
        (FirestoreRecordStore::new(&config, rx).unwrap(), tx)
    }

    fn document(id: &str, fields: Value) -> Value {
        json!({
            "name": format!("projects/demo/databases/(default)/documents/patients/{id}"),
            "fields": fields,
            "createTime": "2024-03-01T10:00:00Z",
            "updateTime": "2024-03-01T10:00:00Z"
        })
    }

    #[test]
    fn test_encode_patient_skips_absent_fields() {
        let fields = PatientFields {
            name: "Anna".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 2),
            height: Some(165.0),
            weight: None,
        };
        let encoded = Value::Object(encode_patient(&fields));
        assert_eq!(
            encoded,
            json!({
                "name": {"stringValue": "Anna"},
                "birthDate": {"stringValue": "1990-01-02"},
                "height": {"doubleValue": 165.0}
            })
        );
    }

    #[test]
    fn test_decode_document_handles_typed_values() {
        let doc = document(
            "abc",
            json!({
                "name": {"stringValue": "Boris"},
                "birthDate": {"timestampValue": "1975-11-30T00:00:00Z"},
                "height": {"integerValue": "180"},
                "weight": {"doubleValue": 90.5},
                "notes": {"nullValue": null}
            }),
        );

        let record = PatientRecord::from_json(&decode_document(&doc).unwrap()).unwrap();
        assert_eq!(record.id.as_str(), "abc");
        assert_eq!(record.name, "Boris");
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1975, 11, 30));
        assert_eq!(record.height, Some(180.0));
        assert_eq!(record.weight, Some(90.5));
    }

    #[test]
    fn test_decode_document_without_name_fails() {
        assert!(decode_document(&json!({"fields": {}})).is_err());
    }

    #[tokio::test]
    async fn test_list_requires_verified_session() {
        let server = mockito::Server::new_async().await;

        let (store, _tx) = store_for(&server, None);
        let err = store.list().await.unwrap_err();
        assert!(matches!(err, RegistryError::Auth(AuthError::NotSignedIn)));

        let (store, _tx) = store_for(&server, Some(session(false)));
        assert!(store.list().await.is_err());
    }

    #[tokio::test]
    async fn test_list_follows_page_tokens() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", COLLECTION_PATH)
            .match_header("authorization", "Bearer tok-1")
            .match_query(Matcher::Exact("pageSize=300".into()))
            .with_status(200)
            .with_body(
                json!({
                    "documents": [document("a", json!({"name": {"stringValue": "Anna"}}))],
                    "nextPageToken": "p2"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", COLLECTION_PATH)
            .match_query(Matcher::Exact("pageSize=300&pageToken=p2".into()))
            .with_status(200)
            .with_body(
                json!({
                    "documents": [
                        document("b", json!({"name": {"stringValue": "Boris"}})),
                        {"fields": {"name": {"stringValue": "nameless"}}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let (store, _tx) = store_for(&server, Some(session(true)));
        let records = store.list().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Anna", "Boris"]);
    }

    #[tokio::test]
    async fn test_empty_collection_lists_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", COLLECTION_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let (store, _tx) = store_for(&server, Some(session(true)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_uses_document_name_as_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COLLECTION_PATH)
            .match_body(Matcher::PartialJson(json!({
                "fields": {"name": {"stringValue": "Anna"}}
            })))
            .with_status(200)
            .with_body(document("newid", json!({"name": {"stringValue": "Anna"}})).to_string())
            .create_async()
            .await;

        let (store, _tx) = store_for(&server, Some(session(true)));
        let fields = PatientFields {
            name: "Anna".to_string(),
            birth_date: None,
            height: Some(165.0),
            weight: Some(60.0),
        };
        let record = store.create(&fields).await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.id.as_str(), "newid");
        assert_eq!(record.height, Some(165.0));
    }

    #[tokio::test]
    async fn test_update_requires_existing_document() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", format!("{COLLECTION_PATH}/gone").as_str())
            .match_query(Matcher::UrlEncoded(
                "currentDocument.exists".into(),
                "true".into(),
            ))
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "No document to update", "status": "NOT_FOUND"}}"#)
            .create_async()
            .await;

        let (store, _tx) = store_for(&server, Some(session(true)));
        let id = PatientId::new("gone").unwrap();
        let fields = PatientFields {
            name: "X".to_string(),
            birth_date: None,
            height: None,
            weight: None,
        };
        let err = store.update(&id, &fields).await.unwrap_err();

        mock.assert_async().await;
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_expired_token_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", format!("{COLLECTION_PATH}/a").as_str())
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "Missing or insufficient permissions."}}"#)
            .create_async()
            .await;

        let (store, _tx) = store_for(&server, Some(session(true)));
        let err = store.delete(&PatientId::new("a").unwrap()).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Store(StoreError::Unauthorized(ref m)) if m.contains("insufficient")
        ));
    }

    #[tokio::test]
    async fn test_sign_out_takes_effect_immediately() {
        let server = mockito::Server::new_async().await;
        let (store, tx) = store_for(&server, Some(session(true)));

        tx.send_replace(None);
        let err = store.get(&PatientId::new("a").unwrap()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Auth(AuthError::NotSignedIn)));
    }
}
