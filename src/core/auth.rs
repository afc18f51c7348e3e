//! Session state and the verified-email gate
//!
//! [`AuthGate`] owns the current session and publishes every change on a watch
//! channel. Record stores that authorize requests read the token from that
//! channel, so signing out cuts off store access at once.

use crate::adapters::identity::{IdentityProvider, Role, Session};
use crate::config::SecretString;
use crate::domain::{AuthError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Sign-up, sign-in and session tracking on top of an [`IdentityProvider`]
pub struct AuthGate<P: IdentityProvider + ?Sized> {
    provider: Arc<P>,
    session: watch::Sender<Option<Session>>,
}

impl<P: IdentityProvider + ?Sized> AuthGate<P> {
    /// Create a gate with nobody signed in
    pub fn new(provider: Arc<P>) -> Self {
        let (session, _) = watch::channel(None);
        Self { provider, session }
    }

    /// Listen for sign-in and sign-out
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    /// The signed-in session, if any
    pub fn current(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    /// Create an account and send its verification email
    ///
    /// The new user stays signed out until the address is verified and they
    /// sign in.
    pub async fn register(&self, email: &str, password: &SecretString, role: Role) -> Result<()> {
        let session = self.provider.register(email, password, role).await?;
        self.provider.send_verification_email(&session).await?;
        self.sign_out();
        Ok(())
    }

    /// Sign in, admitting only verified accounts
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailNotVerified` for an unverified account; the
    /// session is cleared in that case.
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session> {
        let session = match self.provider.sign_in(email, password).await {
            Ok(session) => session,
            Err(e) => {
                self.sign_out();
                return Err(e);
            }
        };

        if !session.email_verified {
            tracing::warn!(uid = %session.uid, "Sign-in refused, email not verified");
            self.sign_out();
            return Err(AuthError::EmailNotVerified.into());
        }

        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Send the verification email again for an account that has not confirmed yet
    pub async fn resend_verification(&self, email: &str, password: &SecretString) -> Result<()> {
        let session = self.provider.sign_in(email, password).await?;
        if session.email_verified {
            tracing::info!(uid = %session.uid, "Email already verified");
            return Ok(());
        }
        self.provider.send_verification_email(&session).await
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        self.provider.send_password_reset(email).await
    }

    pub fn sign_out(&self) {
        let previous = self.session.send_replace(None);
        if let Some(session) = previous {
            tracing::info!(uid = %session.uid, "Signed out");
        }
    }

    /// The session, if it may see patient records
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when nobody is signed in.
    pub fn require_verified(&self) -> Result<Session> {
        match self.current() {
            Some(session) if session.email_verified => Ok(session),
            Some(_) => Err(AuthError::EmailNotVerified.into()),
            None => Err(AuthError::NotSignedIn.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::RegistryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider double with a fixed set of accounts
    struct FakeProvider {
        verified: bool,
        sent: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn new(verified: bool) -> Arc<Self> {
            Arc::new(Self {
                verified,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn session(&self, email: &str, role: Role) -> Session {
            Session {
                uid: format!("uid-{email}"),
                email: email.to_string(),
                email_verified: self.verified,
                role,
                id_token: secret_string("tok".to_string()),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn register(&self, email: &str, _: &SecretString, role: Role) -> Result<Session> {
            Ok(Session {
                email_verified: false,
                ..self.session(email, role)
            })
        }

        async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session> {
            use secrecy::ExposeSecret;
            if password.expose_secret().as_ref() != "right" {
                return Err(AuthError::InvalidCredentials.into());
            }
            Ok(self.session(email, Role::Admin))
        }

        async fn send_verification_email(&self, session: &Session) -> Result<()> {
            self.sent.lock().unwrap().push(format!("verify:{}", session.email));
            Ok(())
        }

        async fn send_password_reset(&self, email: &str) -> Result<()> {
            self.sent.lock().unwrap().push(format!("reset:{email}"));
            Ok(())
        }

        fn provider_name(&self) -> &str {
            "fake"
        }
    }

    fn pw(s: &str) -> SecretString {
        secret_string(s.to_string())
    }

    #[tokio::test]
    async fn test_verified_sign_in_publishes_session() {
        let gate = AuthGate::new(FakeProvider::new(true));
        let mut rx = gate.subscribe();

        let session = gate.sign_in("doc@example.com", &pw("right")).await.unwrap();
        assert_eq!(session.role, Role::Admin);

        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().map(|s| s.email.clone()),
            Some("doc@example.com".to_string())
        );
        assert!(gate.require_verified().is_ok());

        gate.sign_out();
        assert!(rx.borrow_and_update().is_none());
        assert!(matches!(
            gate.require_verified(),
            Err(RegistryError::Auth(AuthError::NotSignedIn))
        ));
    }

    #[tokio::test]
    async fn test_unverified_sign_in_is_refused() {
        let gate = AuthGate::new(FakeProvider::new(false));

        let err = gate.sign_in("doc@example.com", &pw("right")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Auth(AuthError::EmailNotVerified)));
        assert!(gate.current().is_none());
    }

    #[tokio::test]
    async fn test_failed_sign_in_clears_previous_session() {
        let gate = AuthGate::new(FakeProvider::new(true));
        gate.sign_in("a@example.com", &pw("right")).await.unwrap();

        let err = gate.sign_in("b@example.com", &pw("wrong")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Auth(AuthError::InvalidCredentials)));
        assert!(gate.current().is_none());
    }

    #[tokio::test]
    async fn test_register_sends_verification_and_stays_signed_out() {
        let provider = FakeProvider::new(false);
        let gate = AuthGate::new(provider.clone());

        gate.register("new@example.com", &pw("secret"), Role::User)
            .await
            .unwrap();

        assert_eq!(provider.sent(), vec!["verify:new@example.com"]);
        assert!(gate.current().is_none());
    }

    #[tokio::test]
    async fn test_resend_and_reset() {
        let provider = FakeProvider::new(false);
        let gate = AuthGate::new(provider.clone());

        gate.resend_verification("x@example.com", &pw("right"))
            .await
            .unwrap();
        gate.send_password_reset("x@example.com").await.unwrap();

        assert_eq!(provider.sent(), vec!["verify:x@example.com", "reset:x@example.com"]);
    }
}
