//! High-level login orchestration built on the handshake, store, and session layers.

pub mod handshake;
pub mod pending;

mod login;

pub use handshake::*;
pub use login::*;
pub use pending::*;

// self
#[cfg(feature = "reqwest")]
use crate::{config::GatekeeperConfig, provider::OAuth1Provider, store::FileStore};
use crate::{
	_prelude::*,
	gate::AuthGate,
	provider::IdentityProvider,
	session::SessionTokenService,
	store::CredentialStore,
};

/// Default header carrying the session token on protected calls.
pub const DEFAULT_SESSION_HEADER: &str = "Authorization";

/// Coordinates logins against a single identity provider.
///
/// The gatekeeper owns the handshake (and with it the pending request-token table), the
/// credential store, and the session service, so callers only deal with the callback URL,
/// the provider's redirect, and the session token handed back to the client.
#[derive(Clone)]
pub struct Gatekeeper {
	/// Request/access token handshake against the provider.
	pub handshake: OAuthHandshake,
	/// Durable member credentials.
	pub store: Arc<dyn CredentialStore>,
	/// Session token issuer and verifier.
	pub sessions: Arc<SessionTokenService>,
	/// Gate protecting member-only operations.
	pub gate: AuthGate,
	callback: Url,
	session_header: String,
}
impl Gatekeeper {
	/// Wires a gatekeeper whose provider redirects back to `callback`.
	pub fn new(
		provider: Arc<dyn IdentityProvider>,
		store: Arc<dyn CredentialStore>,
		sessions: SessionTokenService,
		callback: Url,
	) -> Self {
		let sessions = Arc::new(sessions);

		Self {
			handshake: OAuthHandshake::new(provider),
			gate: AuthGate::new(sessions.clone(), store.clone()),
			store,
			sessions,
			callback,
			session_header: DEFAULT_SESSION_HEADER.into(),
		}
	}

	/// Builds the production gatekeeper: Trello provider, file-backed store, and the configured
	/// session secret, timeout, and pending TTL.
	#[cfg(feature = "reqwest")]
	pub fn from_config(config: &GatekeeperConfig) -> Result<Self> {
		config.validate()?;

		let descriptor = crate::provider::ProviderDescriptor::trello(&config.app_name)
			.map_err(crate::error::ConfigError::from)?;
		let provider =
			OAuth1Provider::with_timeout(descriptor, config.consumer(), config.request_timeout())?;
		let store = FileStore::open(&config.store_path)?;
		let sessions = SessionTokenService::new(config.session_secret.expose());

		Ok(Self::new(Arc::new(provider), Arc::new(store), sessions, config.callback_url()?)
			.with_pending_ttl(config.pending_ttl())
			.with_session_header(config.session_header.clone()))
	}

	/// Replaces the pending table with an empty one whose entries expire after `ttl`.
	pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
		self.handshake = OAuthHandshake::with_pending(
			self.handshake.provider().clone(),
			Arc::new(PendingRequestTokens::new(ttl)),
		);

		self
	}

	/// Overrides the header the session token is read from.
	pub fn with_session_header(mut self, name: impl Into<String>) -> Self {
		self.session_header = name.into();

		self
	}

	/// Callback URL registered with the provider.
	pub fn callback(&self) -> &Url {
		&self.callback
	}

	/// Header the session token is read from.
	pub fn session_header(&self) -> &str {
		&self.session_header
	}
}
impl Debug for Gatekeeper {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gatekeeper")
			.field("handshake", &self.handshake)
			.field("sessions", &self.sessions)
			.field("callback", &self.callback.as_str())
			.field("session_header", &self.session_header)
			.finish()
	}
}
