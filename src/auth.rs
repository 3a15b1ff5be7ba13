//! Member identities, provider credentials, and redacted secrets.

pub mod credential;
pub mod id;
pub mod member;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use member::*;
pub use secret::*;
