//! Identity toolkit REST implementation
//!
//! Accounts are managed through the `accounts:*` endpoints of the identity
//! toolkit API. Roles live in a `users/{uid}` document of the project's document
//! store, written on registration and read on sign-in.

use super::{IdentityProvider, Role, Session};
use crate::adapters::store::firestore::decode_document;
use crate::adapters::store::http::build_client;
use crate::adapters::store::DocumentCollection;
use crate::config::{secret_string, IdentityConfig, SecretString, StoreConfig};
use crate::domain::{AuthError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Identity provider backed by the identity toolkit REST API
pub struct FirebaseIdentity {
    client: Client,
    base_url: String,
    api_key: SecretString,
    users: Option<DocumentCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    #[serde(default)]
    email_verified: bool,
}

impl FirebaseIdentity {
    /// Create a provider from the identity settings
    ///
    /// Role documents are kept in the store's project; without a `project_id`
    /// every account is treated as a plain user.
    pub fn new(identity: &IdentityConfig, store: &StoreConfig) -> Result<Self> {
        let client = build_client(identity.timeout_seconds, store.tls_verify)?;

        let users = match store.project_id.as_deref() {
            Some(project_id) => Some(DocumentCollection::new(
                client.clone(),
                &store.base_url,
                project_id,
                &identity.users_collection,
            )?),
            None => None,
        };

        Ok(Self {
            client,
            base_url: identity.base_url.trim_end_matches('/').to_string(),
            api_key: identity.api_key.clone(),
            users,
        })
    }

    async fn call(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/accounts:{endpoint}", self.base_url);
        tracing::debug!(endpoint, "Calling identity provider");

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret().as_ref())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Connection(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<Value>()
                .await
                .map_err(|e| AuthError::Provider(format!("invalid response: {e}")).into());
        }

        let body = resp.text().await.unwrap_or_default();
        let code = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        tracing::debug!(endpoint, status = status.as_u16(), %code, "Identity provider refused request");
        Err(provider_error(&code).into())
    }

    async fn email_verified(&self, id_token: &str) -> Result<bool> {
        let body = self.call("lookup", &json!({ "idToken": id_token })).await?;
        let lookup: LookupResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::Provider(format!("invalid lookup response: {e}")))?;

        Ok(lookup
            .users
            .first()
            .map(|u| u.email_verified)
            .unwrap_or(false))
    }

    async fn read_role(&self, uid: &str, id_token: &str) -> Role {
        let Some(ref users) = self.users else {
            return Role::User;
        };

        match users.get_document(uid, id_token).await {
            Ok(document) => decode_document(&document)
                .ok()
                .and_then(|v| v.get("role").and_then(Value::as_str).map(str::to_string))
                .and_then(|r| r.parse().ok())
                .unwrap_or_default(),
            Err(e) if e.is_not_found() => Role::User,
            Err(e) => {
                tracing::warn!(uid, error = %e, "Could not read user role, assuming 'user'");
                Role::User
            }
        }
    }

    async fn write_role(&self, uid: &str, email: &str, role: Role, id_token: &str) -> Result<()> {
        let Some(ref users) = self.users else {
            return Ok(());
        };

        let mut fields = Map::new();
        fields.insert("email".to_string(), json!({ "stringValue": email }));
        fields.insert("role".to_string(), json!({ "stringValue": role.as_str() }));

        users
            .create_document(fields, Some(uid), id_token)
            .await
            .map_err(|e| AuthError::Provider(format!("account created but role not saved: {e}")))?;
        Ok(())
    }
}

fn parse_tokens(body: Value) -> Result<TokenResponse> {
    serde_json::from_value(body)
        .map_err(|e| AuthError::Provider(format!("invalid token response: {e}")).into())
}

/// Maps an identity toolkit error code to an [`AuthError`]
///
/// Codes sometimes carry a detail suffix, e.g. `WEAK_PASSWORD : Password should be
/// at least 6 characters`.
fn provider_error(code: &str) -> AuthError {
    let key = code.split([' ', ':']).next().unwrap_or_default();
    match key {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::Provider("An account with this email already exists".into()),
        "WEAK_PASSWORD" => {
            AuthError::Provider("Password should be at least 6 characters".into())
        }
        "INVALID_EMAIL" => AuthError::Provider("Invalid email address".into()),
        "USER_DISABLED" => AuthError::Provider("This account has been disabled".into()),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => {
            AuthError::Provider("Too many attempts, try again later".into())
        }
        _ => AuthError::Provider(code.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn register(&self, email: &str, password: &SecretString, role: Role) -> Result<Session> {
        let body = self
            .call(
                "signUp",
                &json!({
                    "email": email,
                    "password": password.expose_secret().as_ref(),
                    "returnSecureToken": true
                }),
            )
            .await?;
        let tokens = parse_tokens(body)?;

        self.write_role(&tokens.local_id, email, role, &tokens.id_token)
            .await?;

        tracing::info!(uid = %tokens.local_id, %role, "Account registered");
        Ok(Session {
            uid: tokens.local_id,
            email: tokens.email.unwrap_or_else(|| email.to_string()),
            email_verified: false,
            role,
            id_token: secret_string(tokens.id_token),
        })
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session> {
        let body = self
            .call(
                "signInWithPassword",
                &json!({
                    "email": email,
                    "password": password.expose_secret().as_ref(),
                    "returnSecureToken": true
                }),
            )
            .await?;
        let tokens = parse_tokens(body)?;

        let email_verified = self.email_verified(&tokens.id_token).await?;
        let role = if email_verified {
            self.read_role(&tokens.local_id, &tokens.id_token).await
        } else {
            Role::User
        };

        tracing::info!(uid = %tokens.local_id, email_verified, %role, "Signed in");
        Ok(Session {
            uid: tokens.local_id,
            email: tokens.email.unwrap_or_else(|| email.to_string()),
            email_verified,
            role,
            id_token: secret_string(tokens.id_token),
        })
    }

    async fn send_verification_email(&self, session: &Session) -> Result<()> {
        self.call(
            "sendOobCode",
            &json!({ "requestType": "VERIFY_EMAIL", "idToken": session.bearer_token() }),
        )
        .await?;
        tracing::info!(uid = %session.uid, "Verification email sent");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.call(
            "sendOobCode",
            &json!({ "requestType": "PASSWORD_RESET", "email": email }),
        )
        .await?;
        tracing::info!("Password reset email sent");
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "firebase"
    }
}
