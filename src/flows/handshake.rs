//! OAuth 1.0a three-legged handshake.
//!
//! [`OAuthHandshake::begin`] obtains a request token and parks its secret in the pending table;
//! [`OAuthHandshake::complete`] redeems the callback. The pending entry is removed before the
//! provider is contacted, so every request token is usable exactly once whatever the exchange
//! outcome, and unknown tokens never reach the provider.

// self
use crate::{
	_prelude::*,
	auth::AccessCredential,
	flows::{PendingRequestToken, PendingRequestTokens},
	obs::{self, FlowKind, FlowSpan, SecurityEvent},
	provider::IdentityProvider,
};

/// Request/access token state machine bound to one provider.
#[derive(Clone)]
pub struct OAuthHandshake {
	provider: Arc<dyn IdentityProvider>,
	pending: Arc<PendingRequestTokens>,
}
impl OAuthHandshake {
	/// Creates a handshake with a fresh pending table using the default TTL.
	pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
		Self::with_pending(provider, Arc::new(PendingRequestTokens::default()))
	}

	/// Creates a handshake sharing an existing pending table.
	pub fn with_pending(
		provider: Arc<dyn IdentityProvider>,
		pending: Arc<PendingRequestTokens>,
	) -> Self {
		Self { provider, pending }
	}

	/// Pending request tokens awaiting a callback.
	pub fn pending(&self) -> &Arc<PendingRequestTokens> {
		&self.pending
	}

	/// Provider the handshake talks to.
	pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
		&self.provider
	}

	/// Obtains a request token whose approval redirects to `callback` and returns the URL the
	/// client must visit.
	pub async fn begin(&self, callback: &Url) -> Result<Url> {
		FlowSpan::new(FlowKind::BeginHandshake, "begin")
			.run(async move {
				let grant = self.provider.get_request_token(callback).await?;
				let now = OffsetDateTime::now_utc();

				self.pending.insert(
					PendingRequestToken { token: grant.token, secret: grant.secret, issued_at: now },
					now,
				);

				Ok(grant.authorize_url)
			})
			.await
	}

	/// Redeems the callback for `request_token` and returns the provider access credential.
	pub async fn complete(&self, request_token: &str, verifier: &str) -> Result<AccessCredential> {
		FlowSpan::new(FlowKind::CompleteHandshake, "complete")
			.run(async move {
				let Some(pending) = self.pending.take(request_token, OffsetDateTime::now_utc())
				else {
					obs::record_security_event(
						SecurityEvent::UnknownRequestToken,
						"callback presented a request token that is not pending",
					);

					return Err(Error::UnknownRequestToken);
				};
				let credential =
					self.provider.exchange_token(&pending.token, &pending.secret, verifier).await?;

				Ok(credential)
			})
			.await
	}
}
impl Debug for OAuthHandshake {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthHandshake").field("pending", &self.pending.len()).finish()
	}
}
