//! Storage contract and built-in backends for member credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Member, MemberId},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable mapping from member identity to provider access credential.
///
/// Implementations must serialize writes per key; callers never rely on atomicity across
/// more than one call.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Inserts or replaces the member keyed by [`Member::id`].
	fn save_member(&self, member: Member) -> StoreFuture<'_, ()>;

	/// Fetches the member with the provided identity; `Ok(None)` when absent.
	fn get_member<'a>(&'a self, id: &'a MemberId) -> StoreFuture<'a, Option<Member>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
