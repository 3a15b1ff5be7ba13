//! The identity-provider seam used by the handshake and login flows.

// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, MemberId, TokenSecret},
	error::ProviderError,
};

/// Boxed future returned by [`IdentityProvider`] calls.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Temporary credentials returned by the provider's request-token endpoint.
#[derive(Clone)]
pub struct RequestTokenGrant {
	/// Request token value; keys the pending table.
	pub token: String,
	/// Request token secret used to sign the verifier exchange.
	pub secret: TokenSecret,
	/// Page the client must be redirected to in order to approve the token.
	pub authorize_url: Url,
}
impl Debug for RequestTokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestTokenGrant")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("authorize_url", &self.authorize_url)
			.finish()
	}
}

/// Network calls the gatekeeper makes against a single OAuth 1.0a provider.
///
/// Implementations must bound every call with a timeout and report it as
/// [`ProviderError::Timeout`]; the gatekeeper never retries on its own.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Requests a fresh request token whose approval redirects to `callback`.
	fn get_request_token<'a>(&'a self, callback: &'a Url) -> ProviderFuture<'a, RequestTokenGrant>;

	/// Exchanges an approved request token and its verifier for an access credential.
	fn exchange_token<'a>(
		&'a self,
		token: &'a str,
		secret: &'a TokenSecret,
		verifier: &'a str,
	) -> ProviderFuture<'a, AccessCredential>;

	/// Resolves the member the credential belongs to.
	fn who_am_i<'a>(&'a self, credential: &'a AccessCredential) -> ProviderFuture<'a, MemberId>;
}
