//! Account sign-up, sign-in and verification
//!
//! Only the document store backend needs accounts; the REST and memory backends
//! run without any identity provider.

pub mod firebase;
pub mod session;
pub mod traits;

pub use firebase::FirebaseIdentity;
pub use session::{Role, Session};
pub use traits::IdentityProvider;
