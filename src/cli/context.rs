//! Shared setup for record commands
//!
//! Loads the configuration, builds the record store and, for the document store
//! backend, signs in with the configured account.

use crate::adapters::identity::{FirebaseIdentity, IdentityProvider, Session};
use crate::adapters::store::{create_record_store, RecordStore};
use crate::config::{load_config, IdentityConfig, RegistryConfig};
use crate::core::auth::AuthGate;
use crate::core::orchestrator::{FailureKind, Outcome, ViewOrchestrator};
use crate::domain::{AuthError, RegistryError, StoreError};
use std::sync::Arc;

/// Exit codes shared by all commands
pub mod exit {
    pub const OK: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const REFUSED: i32 = 3;
    pub const CONNECTION: i32 = 4;
}

/// Exit code for an error that ends a command
pub fn exit_code_for(err: &RegistryError) -> i32 {
    match err {
        RegistryError::Configuration(_) => exit::CONFIG,
        RegistryError::Auth(AuthError::Connection(_))
        | RegistryError::Store(StoreError::Connection(_)) => exit::CONNECTION,
        RegistryError::Validation(_)
        | RegistryError::Auth(_)
        | RegistryError::Store(StoreError::Unauthorized(_)) => exit::REFUSED,
        _ => exit::FAILURE,
    }
}

/// Exit code for an action outcome
pub fn exit_code_for_outcome(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Invalid(_) => exit::REFUSED,
        Outcome::Failed(failure) => match failure.kind {
            FailureKind::Unauthorized => exit::REFUSED,
            FailureKind::Connection => exit::CONNECTION,
            _ => exit::FAILURE,
        },
        _ => exit::OK,
    }
}

/// Loads and validates the configuration, printing the reason on failure
pub fn load(config_path: &str) -> Result<RegistryConfig, i32> {
    match load_config(config_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::error!(config_path, error = %e, "Failed to load configuration");
            println!("❌ Failed to load configuration file: {config_path}");
            println!("   Error: {e}");
            println!("   Run 'registry init' to create one.");
            Err(exit::CONFIG)
        }
    }
}

/// Identity provider for the configured `[identity]` section
pub fn identity_provider(config: &RegistryConfig) -> Result<Arc<FirebaseIdentity>, i32> {
    let Some(ref identity) = config.identity else {
        println!("❌ No [identity] section in the configuration");
        return Err(exit::CONFIG);
    };

    FirebaseIdentity::new(identity, &config.store)
        .map(Arc::new)
        .map_err(|e| {
            println!("❌ Failed to set up the identity provider");
            println!("   Error: {e}");
            exit::CONFIG
        })
}

/// Everything a record command needs
pub struct Registry {
    pub config: RegistryConfig,
    pub view: ViewOrchestrator<dyn RecordStore>,
    pub auth: Option<AuthGate<dyn IdentityProvider>>,
}

impl Registry {
    /// Builds the store and, when the backend requires it, an auth gate
    ///
    /// Nobody is signed in yet; see [`Registry::open`] for one-shot commands.
    pub fn connect(config: RegistryConfig) -> Result<Self, i32> {
        let auth = match config.identity {
            Some(_) => {
                let provider: Arc<dyn IdentityProvider> = identity_provider(&config)?;
                Some(AuthGate::new(provider))
            }
            None => None,
        };

        let session = match auth {
            Some(ref gate) => gate.subscribe(),
            None => tokio::sync::watch::channel(None).1,
        };

        let store = create_record_store(&config, session).map_err(|e| {
            println!("❌ Failed to set up the record store");
            println!("   Error: {e}");
            exit_code_for(&e)
        })?;

        Ok(Self {
            config,
            view: ViewOrchestrator::new(store),
            auth,
        })
    }

    /// Loads the configuration, connects and signs in if needed
    pub async fn open(config_path: &str) -> Result<Self, i32> {
        let config = load(config_path)?;
        let registry = Self::connect(config)?;

        if registry.config.requires_auth() {
            registry.sign_in_configured().await?;
        }
        Ok(registry)
    }

    /// Signs in with the account named in `[identity]`
    async fn sign_in_configured(&self) -> Result<Session, i32> {
        let (Some(gate), Some(identity)) = (self.auth.as_ref(), self.config.identity.as_ref())
        else {
            println!("❌ The {} backend needs an [identity] section", self.config.store.backend);
            return Err(exit::CONFIG);
        };

        let Some((email, password)) = configured_credentials(identity) else {
            println!("❌ Not signed in");
            println!("   Set REGISTRY_IDENTITY_EMAIL and REGISTRY_IDENTITY_PASSWORD,");
            println!("   or use 'registry shell' and the 'login' command.");
            return Err(exit::REFUSED);
        };

        gate.sign_in(email, password).await.map_err(|e| {
            println!("❌ Sign-in failed: {e}");
            exit_code_for(&e)
        })
    }
}

fn configured_credentials(identity: &IdentityConfig) -> Option<(&str, &crate::config::SecretString)> {
    match (identity.email.as_deref(), identity.password.as_ref()) {
        (Some(email), Some(password)) => Some((email, password)),
        _ => None,
    }
}

/// Prints an outcome's notice with a status marker
pub fn print_notice(outcome: &Outcome) {
    use crate::core::orchestrator::NoticeLevel;

    let notice = outcome.notice();
    let marker = match notice.level {
        NoticeLevel::Success => "✅",
        NoticeLevel::Info => "ℹ️ ",
        NoticeLevel::Warning => "⚠️ ",
        NoticeLevel::Error => "❌",
    };
    println!("{marker} {notice}");

    if let Outcome::Invalid(report) = outcome {
        for (field, message) in &report.field_errors {
            println!("   {field}: {message}");
        }
    }
}
