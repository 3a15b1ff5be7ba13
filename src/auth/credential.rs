//! Long-lived provider access credentials.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// OAuth 1.0a access token + secret pair authorizing provider calls on behalf of a member.
///
/// The gatekeeper never interprets the credential; it is persisted verbatim and handed back
/// to the [`IdentityProvider`](crate::provider::IdentityProvider) when signing requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCredential {
	/// Access token value (`oauth_token`).
	pub token: String,
	/// Access token secret (`oauth_token_secret`); callers must avoid logging it.
	pub secret: TokenSecret,
	/// Provider-specific extras returned alongside the token.
	#[serde(default)]
	pub additional_data: BTreeMap<String, String>,
}
impl AccessCredential {
	/// Builds a credential without provider extras.
	pub fn new(token: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), secret: secret.into(), additional_data: BTreeMap::new() }
	}

	/// Attaches a provider-specific extra field.
	pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_data.insert(key.into(), value.into());

		self
	}
}
impl Debug for AccessCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessCredential")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("additional_data", &self.additional_data)
			.finish()
	}
}
