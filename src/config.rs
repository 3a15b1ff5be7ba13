//! Deployment configuration for the gatekeeper.
//!
//! The document is JSON; every field except the provider consumer pair and the session secret
//! has a default, and unknown fields are rejected so typos surface at startup. Parse errors
//! carry the path of the offending field.

// std
use std::{
	path::{Path, PathBuf},
	time::Duration as StdDuration,
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	flows::{DEFAULT_PENDING_TTL, DEFAULT_SESSION_HEADER},
	provider::ConsumerCredentials,
};

/// Minimum accepted session secret length in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 16;

const DEFAULT_APP_NAME: &str = "Trello Regexp";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_STORE_PATH: &str = "store.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const CALLBACK_PATH: [&str; 2] = ["auth", "callback"];

/// Gatekeeper settings loaded at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatekeeperConfig {
	/// Application name shown on the provider's approval page.
	pub app_name: String,
	/// Public base URL; the OAuth callback is `{base_url}/auth/callback`.
	pub base_url: String,
	/// Provider consumer key.
	pub consumer_key: String,
	/// Provider consumer secret.
	pub consumer_secret: TokenSecret,
	/// Secret used to sign session tokens.
	pub session_secret: TokenSecret,
	/// Header the session token is read from.
	pub session_header: String,
	/// File backing the credential store.
	pub store_path: PathBuf,
	/// Timeout applied to every provider call, in seconds.
	pub request_timeout_secs: u64,
	/// How long a request token stays redeemable, in seconds.
	pub pending_ttl_secs: u64,
}
impl GatekeeperConfig {
	/// Parses a JSON document. Call [`GatekeeperConfig::validate`] before use.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(de)
			.map_err(|source| ConfigError::Parse { path: source.path().to_string(), source })
	}

	/// Reads and parses the JSON document at `path`.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;

		Self::from_json(&raw)
	}

	/// Checks the settings the gatekeeper cannot run without.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.app_name.trim().is_empty() {
			return Err(ConfigError::Empty { field: "app_name" });
		}
		if self.consumer_key.trim().is_empty() {
			return Err(ConfigError::Empty { field: "consumer_key" });
		}
		if self.consumer_secret.is_empty() {
			return Err(ConfigError::Empty { field: "consumer_secret" });
		}
		if self.session_secret.len() < MIN_SESSION_SECRET_LEN {
			return Err(ConfigError::WeakSessionSecret { min: MIN_SESSION_SECRET_LEN });
		}
		if !is_header_name(&self.session_header) {
			return Err(ConfigError::InvalidSessionHeader { name: self.session_header.clone() });
		}

		self.callback_url().map(|_| ())
	}

	/// Callback URL handed to the provider.
	pub fn callback_url(&self) -> Result<Url, ConfigError> {
		let invalid = || ConfigError::InvalidCallbackBase { url: self.base_url.clone() };
		let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;

		url.set_query(None);
		url.set_fragment(None);
		url.path_segments_mut().map_err(|_| invalid())?.pop_if_empty().extend(CALLBACK_PATH);

		Ok(url)
	}

	/// Provider call timeout.
	pub fn request_timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.request_timeout_secs)
	}

	/// Pending request-token lifetime.
	pub fn pending_ttl(&self) -> Duration {
		Duration::seconds(i64::try_from(self.pending_ttl_secs).unwrap_or(i64::MAX))
	}

	/// Consumer credentials for request signing.
	pub fn consumer(&self) -> ConsumerCredentials {
		ConsumerCredentials::new(self.consumer_key.clone(), self.consumer_secret.clone())
	}
}
impl Default for GatekeeperConfig {
	fn default() -> Self {
		Self {
			app_name: DEFAULT_APP_NAME.into(),
			base_url: DEFAULT_BASE_URL.into(),
			consumer_key: String::new(),
			consumer_secret: TokenSecret::default(),
			session_secret: TokenSecret::default(),
			session_header: DEFAULT_SESSION_HEADER.into(),
			store_path: DEFAULT_STORE_PATH.into(),
			request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
			pending_ttl_secs: DEFAULT_PENDING_TTL.whole_seconds().unsigned_abs(),
		}
	}
}

// RFC 9110 `token`.
fn is_header_name(name: &str) -> bool {
	!name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn valid() -> GatekeeperConfig {
		GatekeeperConfig::from_json(
			r#"{
				"consumer_key": "key",
				"consumer_secret": "secret",
				"session_secret": "0123456789abcdef"
			}"#,
		)
		.expect("Minimal config should parse.")
	}

	#[test]
	fn defaults_fill_missing_fields() {
		let config = valid();

		config.validate().expect("Minimal config should validate.");

		assert_eq!(config.app_name, "Trello Regexp");
		assert_eq!(config.session_header, "Authorization");
		assert_eq!(config.store_path, PathBuf::from("store.json"));
		assert_eq!(config.request_timeout(), StdDuration::from_secs(10));
		assert_eq!(config.pending_ttl(), Duration::minutes(15));
		assert_eq!(
			config.callback_url().expect("Default base URL should yield a callback.").as_str(),
			"http://localhost:8080/auth/callback"
		);
	}

	#[test]
	fn callback_respects_base_path() {
		let config = GatekeeperConfig { base_url: "https://app.example.com/gk/".into(), ..valid() };

		assert_eq!(
			config.callback_url().expect("Base URL with path should yield a callback.").as_str(),
			"https://app.example.com/gk/auth/callback"
		);
		assert!(matches!(
			GatekeeperConfig { base_url: "mailto:ops@example.com".into(), ..valid() }.validate(),
			Err(ConfigError::InvalidCallbackBase { .. })
		));
	}

	#[test]
	fn parse_errors_name_the_field() {
		let err = GatekeeperConfig::from_json(r#"{"request_timeout_secs": "ten"}"#)
			.expect_err("String timeout must be rejected.");

		match err {
			ConfigError::Parse { path, .. } => assert_eq!(path, "request_timeout_secs"),
			other => panic!("Unexpected error: {other:?}"),
		}

		assert!(GatekeeperConfig::from_json(r#"{"consumer_kye": "typo"}"#).is_err());
	}

	#[test]
	fn validation_rejects_weak_or_missing_secrets() {
		assert!(matches!(
			GatekeeperConfig { session_secret: "short".into(), ..valid() }.validate(),
			Err(ConfigError::WeakSessionSecret { min: MIN_SESSION_SECRET_LEN })
		));
		assert!(matches!(
			GatekeeperConfig { consumer_key: " ".into(), ..valid() }.validate(),
			Err(ConfigError::Empty { field: "consumer_key" })
		));
		assert!(matches!(
			GatekeeperConfig { session_header: "X Session".into(), ..valid() }.validate(),
			Err(ConfigError::InvalidSessionHeader { .. })
		));
	}
}
