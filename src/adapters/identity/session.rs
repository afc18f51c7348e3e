//! Signed-in user session and role

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role stored alongside each account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Invalid role '{other}'. Must be one of: user, admin")),
        }
    }
}

/// An authenticated account
///
/// The id token is the bearer credential for document store requests. It is
/// never logged; `Debug` on [`SecretString`] prints a redacted placeholder.
#[derive(Debug, Clone)]
pub struct Session {
    /// Provider-assigned account id
    pub uid: String,

    /// Sign-in email address
    pub email: String,

    /// Whether the email address has been confirmed
    pub email_verified: bool,

    /// Role read from the users collection
    pub role: Role,

    /// Bearer token for store requests
    pub id_token: SecretString,
}

impl Session {
    /// Bearer token as sent in the `Authorization` header
    pub fn bearer_token(&self) -> &str {
        self.id_token.expose_secret().as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_session_debug_hides_token() {
        let session = Session {
            uid: "u1".to_string(),
            email: "doc@example.com".to_string(),
            email_verified: true,
            role: Role::Admin,
            id_token: secret_string("tok-secret".to_string()),
        };
        assert_eq!(session.bearer_token(), "tok-secret");
        assert!(!format!("{session:?}").contains("tok-secret"));
    }
}
