//! Member records persisted by the credential store.

// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, MemberId},
};

/// A user of the gatekeeper, keyed by the provider's member identity.
///
/// Created on the first completed login for an identity; later logins replace
/// `access_credential` while `id` stays fixed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
	/// Provider-assigned identity, immutable once stored.
	pub id: MemberId,
	/// Most recent access credential granted by the provider.
	pub access_credential: AccessCredential,
}
impl Member {
	/// Pairs a member identity with its access credential.
	pub fn new(id: MemberId, access_credential: AccessCredential) -> Self {
		Self { id, access_credential }
	}
}
