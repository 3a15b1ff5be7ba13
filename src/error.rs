//! Gatekeeper-level error types shared across the handshake, session, and store layers.

// self
use crate::{_prelude::*, provider::ProviderStage};

/// Gatekeeper-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gatekeeper error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The identity provider rejected a call or could not be reached.
	#[error(transparent)]
	Provider(#[from] ProviderError),
	/// Session token could not be issued or verified.
	#[error(transparent)]
	Session(#[from] crate::session::SessionError),

	/// Callback referenced a request token that is not pending (forged, replayed, or expired).
	#[error("Request token is unknown, expired, or already consumed.")]
	UnknownRequestToken,
}
impl Error {
	/// Returns the HTTP status the error should surface as.
	///
	/// Session verification problems collapse into `401` so callers cannot tell which check
	/// failed; signing failures and everything else are server-side failures.
	pub fn http_status(&self) -> u16 {
		match self {
			Self::Session(crate::session::SessionError::Signing { .. }) => 500,
			Self::Session(_) => 401,
			_ => 500,
		}
	}
}

/// Configuration and validation failures raised while assembling the gatekeeper.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A configured identifier is malformed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Configuration file could not be read.
	#[error("Configuration file `{path}` could not be read.")]
	Read {
		/// Path that was attempted.
		path: String,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration is invalid at `{path}`.")]
	Parse {
		/// Path of the offending field inside the document.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Base URL cannot carry a callback path.
	#[error("Base URL `{url}` cannot be used to derive the OAuth callback.")]
	InvalidCallbackBase {
		/// Offending base URL.
		url: String,
	},
	/// A required value is empty.
	#[error("Configuration value `{field}` must not be empty.")]
	Empty {
		/// Name of the empty field.
		field: &'static str,
	},
	/// Session signing secret is too short to resist brute force.
	#[error("Session secret must be at least {min} bytes long.")]
	WeakSessionSecret {
		/// Minimum accepted length in bytes.
		min: usize,
	},
	/// Session header name is not a valid HTTP header token.
	#[error("Session header `{name}` is not a valid HTTP header name.")]
	InvalidSessionHeader {
		/// Rejected header name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures talking to the identity provider. Never retried automatically.
#[derive(Debug, ThisError)]
pub enum ProviderError {
	/// Provider answered with a non-success status.
	#[error("Provider rejected the {stage} request with HTTP {status}.")]
	Rejected {
		/// Handshake stage that failed.
		stage: ProviderStage,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Provider answered successfully but the payload is unusable.
	#[error("Provider returned a malformed {stage} response: {reason}.")]
	MalformedResponse {
		/// Handshake stage that failed.
		stage: ProviderStage,
		/// What was wrong with the payload.
		reason: String,
	},
	/// Identity payload is not the expected JSON document.
	#[error("Provider returned an unparseable identity payload.")]
	IdentityParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The request did not complete before the configured timeout.
	#[error("Provider {stage} request timed out.")]
	Timeout {
		/// Handshake stage that timed out.
		stage: ProviderStage,
	},
	/// Network failure (DNS, TCP, TLS).
	#[error("Network error occurred while calling the provider's {stage} endpoint.")]
	Network {
		/// Handshake stage that failed.
		stage: ProviderStage,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl ProviderError {
	/// Wraps a transport-specific network error.
	pub fn network(stage: ProviderStage, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { stage, source: Box::new(src) }
	}

	/// Returns the handshake stage the failure belongs to.
	pub fn stage(&self) -> ProviderStage {
		match self {
			Self::Rejected { stage, .. }
			| Self::MalformedResponse { stage, .. }
			| Self::Timeout { stage }
			| Self::Network { stage, .. } => *stage,
			Self::IdentityParse { .. } => ProviderStage::Identity,
		}
	}
}
