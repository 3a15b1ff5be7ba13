//! Identity-provider descriptors (data), request signing, and provider clients (behavior).
//!
//! `descriptor` exposes validated endpoint metadata (`ProviderDescriptor`), including the
//! Trello preset. `signature` implements OAuth 1.0a request signing. [`IdentityProvider`] is
//! the seam flows call into; `oauth1` ships the reqwest-backed implementation and `memory`
//! an in-process simulator for tests and offline demos.

pub mod descriptor;
pub mod identity;
pub mod memory;
#[cfg(feature = "reqwest")] pub mod oauth1;
pub mod signature;

pub use descriptor::*;
pub use identity::*;
pub use memory::MemoryIdentityProvider;
#[cfg(feature = "reqwest")] pub use oauth1::OAuth1Provider;
pub use signature::*;

// self
use crate::_prelude::*;

/// Provider round-trips performed during a login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStage {
	/// Temporary credential request (`GetRequestToken`).
	RequestToken,
	/// Verifier exchange for the access credential (`ExchangeToken`).
	AccessToken,
	/// Current-member lookup (`WhoAmI`).
	Identity,
}
impl ProviderStage {
	/// Returns a stable label suitable for error messages and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderStage::RequestToken => "request_token",
			ProviderStage::AccessToken => "access_token",
			ProviderStage::Identity => "identity",
		}
	}
}
impl Display for ProviderStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
