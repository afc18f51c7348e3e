//! Account commands: `register`, `login`, `reset-password`

use crate::adapters::identity::{IdentityProvider, Role};
use crate::cli::context::{exit, exit_code_for, identity_provider, load};
use crate::config::secret_string;
use crate::core::auth::AuthGate;
use crate::domain::AuthError;
use clap::Args;
use std::sync::Arc;

/// Arguments for the register command
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Email address of the new account
    #[arg(long)]
    pub email: String,

    /// Password of the new account
    #[arg(long, env = "REGISTRY_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Role of the new account (user, admin)
    #[arg(long, default_value = "user")]
    pub role: Role,
}

impl RegisterArgs {
    /// Execute the register command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let gate = match open_gate(config_path) {
            Ok(g) => g,
            Err(code) => return Ok(code),
        };

        let password = secret_string(self.password.clone());
        match gate.register(&self.email, &password, self.role).await {
            Ok(()) => {
                println!("✅ Account created for {}", self.email);
                println!("   A verification link was sent; sign in after confirming it.");
                Ok(exit::OK)
            }
            Err(e) => {
                println!("❌ Registration failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long, env = "REGISTRY_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Send the verification email again if the address is not confirmed
    #[arg(long)]
    pub resend_verification: bool,
}

impl LoginArgs {
    /// Execute the login command
    ///
    /// Sessions are not persisted between invocations, so this checks the
    /// credentials and reports the account status.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let gate = match open_gate(config_path) {
            Ok(g) => g,
            Err(code) => return Ok(code),
        };

        let password = secret_string(self.password.clone());
        match gate.sign_in(&self.email, &password).await {
            Ok(session) => {
                println!("✅ Signed in as {} ({})", session.email, session.role);
                if session.role.is_admin() {
                    println!("   Administrator access");
                }
                gate.sign_out();
                Ok(exit::OK)
            }
            Err(crate::domain::RegistryError::Auth(AuthError::EmailNotVerified))
                if self.resend_verification =>
            {
                match gate.resend_verification(&self.email, &password).await {
                    Ok(()) => {
                        println!("⚠️  Email address not verified; a new verification link was sent");
                        Ok(exit::REFUSED)
                    }
                    Err(e) => {
                        println!("❌ Could not resend verification: {e}");
                        Ok(exit_code_for(&e))
                    }
                }
            }
            Err(e) => {
                println!("❌ Sign-in failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// Arguments for the reset-password command
#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    /// Email address of the account
    #[arg(long)]
    pub email: String,
}

impl ResetPasswordArgs {
    /// Execute the reset-password command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let gate = match open_gate(config_path) {
            Ok(g) => g,
            Err(code) => return Ok(code),
        };

        match gate.send_password_reset(&self.email).await {
            Ok(()) => {
                println!("✅ Password reset email sent to {}", self.email);
                Ok(exit::OK)
            }
            Err(e) => {
                println!("❌ Password reset failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

fn open_gate(config_path: &str) -> Result<AuthGate<dyn IdentityProvider>, i32> {
    let config = load(config_path)?;
    let provider: Arc<dyn IdentityProvider> = identity_provider(&config)?;
    Ok(AuthGate::new(provider))
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_register_parses_role() {
        let cli = Cli::parse_from([
            "registry",
            "register",
            "--email",
            "a@example.com",
            "--password",
            "pw123456",
            "--role",
            "admin",
        ]);
        match cli.command {
            Commands::Register(args) => assert!(args.role.is_admin()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "registry",
            "register",
            "--email",
            "a@example.com",
            "--password",
            "pw",
            "--role",
            "root",
        ]);
        assert!(result.is_err());
    }
}
