//! REST records server backend
//!
//! Talks to a json-server style resource: `GET/POST {base}/{collection}` and
//! `GET/PUT/DELETE {base}/{collection}/{id}`. The server assigns ids on create and
//! returns the created record.

use super::http::{
    build_client, connection_error, ensure_success, join_segments, parse_base_url, read_json,
};
use super::RecordStore;
use crate::config::StoreConfig;
use crate::domain::{PatientFields, PatientId, PatientRecord, Result, StoreError};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Record store backed by a plain REST resource
///
/// # Example
///
/// ```no_run
/// use ag_registry::adapters::store::{RecordStore, RestRecordStore};
/// use ag_registry::config::StoreConfig;
///
/// # async fn example() -> ag_registry::domain::Result<()> {
/// let store = RestRecordStore::new(&StoreConfig::default())?;
/// for record in store.list().await? {
///     println!("{} {}", record.id, record.display_name());
/// }
/// # Ok(())
/// # }
/// ```
pub struct RestRecordStore {
    client: Client,
    collection_url: Url,
}

impl RestRecordStore {
    /// Create a store for the configured base URL and collection
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is unusable.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;
        let collection_url = join_segments(&base, &[config.collection.as_str()])?;
        let client = build_client(config.timeout_seconds, config.tls_verify)?;

        tracing::debug!(url = %collection_url, "REST record store ready");

        Ok(Self {
            client,
            collection_url,
        })
    }

    fn record_url(&self, id: &PatientId) -> Result<Url> {
        join_segments(&self.collection_url, &[id.as_str()])
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn list(&self) -> Result<Vec<PatientRecord>> {
        tracing::debug!(url = %self.collection_url, "Fetching patient list");

        let resp = self
            .client
            .get(self.collection_url.clone())
            .send()
            .await
            .map_err(connection_error)?;
        let body = read_json(ensure_success(resp, None).await?).await?;

        let items = body.as_array().ok_or_else(|| {
            StoreError::InvalidResponse(format!(
                "expected a JSON array from {}, got {}",
                self.collection_url,
                type_name(&body)
            ))
        })?;

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match PatientRecord::from_json(item) {
                Ok(record) => records.push(record),
                Err(reason) => tracing::warn!(%reason, "Skipping malformed patient record"),
            }
        }
        Ok(records)
    }

    async fn get(&self, id: &PatientId) -> Result<PatientRecord> {
        let resp = self
            .client
            .get(self.record_url(id)?)
            .send()
            .await
            .map_err(connection_error)?;
        let body = read_json(ensure_success(resp, Some(id.as_str())).await?).await?;

        PatientRecord::from_json(&body).map_err(|e| StoreError::InvalidResponse(e).into())
    }

    async fn create(&self, fields: &PatientFields) -> Result<PatientRecord> {
        let resp = self
            .client
            .post(self.collection_url.clone())
            .json(fields)
            .send()
            .await
            .map_err(connection_error)?;
        let body = read_json(ensure_success(resp, None).await?).await?;

        let record = PatientRecord::from_json(&body).map_err(|e| {
            StoreError::InvalidResponse(format!("create did not return a record: {e}"))
        })?;

        tracing::info!(patient_id = %record.id, "Patient record created");
        Ok(record)
    }

    async fn update(&self, id: &PatientId, fields: &PatientFields) -> Result<()> {
        let resp = self
            .client
            .put(self.record_url(id)?)
            .json(fields)
            .send()
            .await
            .map_err(connection_error)?;
        ensure_success(resp, Some(id.as_str())).await?;

        tracing::info!(patient_id = %id, "Patient record updated");
        Ok(())
    }

    async fn delete(&self, id: &PatientId) -> Result<()> {
        let resp = self
            .client
            .delete(self.record_url(id)?)
            .send()
            .await
            .map_err(connection_error)?;
        ensure_success(resp, Some(id.as_str())).await?;

        tracing::info!(patient_id = %id, "Patient record deleted");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "rest"
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegistryError;
    use mockito::Matcher;
    use serde_json::json;

    fn store_for(server: &mockito::ServerGuard) -> RestRecordStore {
        let config = StoreConfig {
            base_url: server.url(),
            timeout_seconds: 5,
            ..Default::default()
        };
        RestRecordStore::new(&config).unwrap()
    }

    fn fields() -> PatientFields {
        PatientFields {
            name: "Ivan Petrov".to_string(),
            birth_date: None,
            height: Some(178.0),
            weight: Some(82.0),
        }
    }

    #[tokio::test]
    async fn test_list_skips_malformed_records() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/patients")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"id": "1", "name": "Anna", "height": 165, "weight": 60},
                    {"name": "no id"},
                    {"id": "3", "name": 42},
                    {"id": 4, "name": "Boris"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let records = store_for(&server).list().await.unwrap();
        mock.assert_async().await;

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[tokio::test]
    async fn test_list_rejects_non_array_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients")
            .with_status(200)
            .with_body(r#"{"patients": []}"#)
            .create_async()
            .await;

        let err = store_for(&server).list().await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Store(StoreError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_list_server_error_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = store_for(&server).list().await.unwrap_err();
        match err {
            RegistryError::Store(StoreError::Rejected { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_posts_fields_and_returns_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/patients")
            .match_body(Matcher::Json(json!({
                "name": "Ivan Petrov",
                "height": 178.0,
                "weight": 82.0
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"id": "7a1f", "name": "Ivan Petrov", "height": 178, "weight": 82})
                    .to_string(),
            )
            .create_async()
            .await;

        let record = store_for(&server).create(&fields()).await.unwrap();
        mock.assert_async().await;

        assert_eq!(record.id.as_str(), "7a1f");
        assert_eq!(record.fields(), fields());
    }

    #[tokio::test]
    async fn test_create_without_id_in_response_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/patients")
            .with_status(201)
            .with_body(r#"{"name": "Ivan Petrov"}"#)
            .create_async()
            .await;

        let err = store_for(&server).create(&fields()).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Store(StoreError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_update_puts_to_record_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/patients/7")
            .match_body(Matcher::PartialJson(json!({"name": "Ivan Petrov"})))
            .with_status(200)
            .with_body(r#"{"id": "7", "name": "Ivan Petrov"}"#)
            .create_async()
            .await;

        let id: PatientId = "7".parse().unwrap();
        store_for(&server).update(&id, &fields()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients/99")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let id: PatientId = "99".parse().unwrap();
        let err = store_for(&server).get(&id).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/patients/99")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let id: PatientId = "99".parse().unwrap();
        let err = store_for(&server).delete(&id).await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::NotFound(ref s)) if s == "99"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let config = StoreConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..Default::default()
        };
        let store = RestRecordStore::new(&config).unwrap();

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::Connection(_))));
    }
}
