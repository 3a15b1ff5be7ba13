// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ProviderId},
	provider::{ProviderDescriptor, ProviderEndpoints, SignatureMethod},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Descriptor identifier is malformed.
	#[error(transparent)]
	InvalidId(IdentifierError),
	/// A required endpoint was never configured.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS (plain HTTP is tolerated for loopback hosts only).
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint URL could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Raw value that failed to parse.
		url: String,
	},
	/// Authorize params may not shadow protocol parameters.
	#[error("Authorize parameter `{name}` is reserved by the OAuth 1.0a protocol.")]
	ReservedAuthorizeParam {
		/// Offending parameter name.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	id: ProviderId,
	request_token_endpoint: Option<Url>,
	authorize_endpoint: Option<Url>,
	access_token_endpoint: Option<Url>,
	identity_endpoint: Option<Url>,
	authorize_params: BTreeMap<String, String>,
	signature_method: SignatureMethod,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			request_token_endpoint: None,
			authorize_endpoint: None,
			access_token_endpoint: None,
			identity_endpoint: None,
			authorize_params: BTreeMap::new(),
			signature_method: SignatureMethod::default(),
		}
	}

	/// Sets the request token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorization page.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the access token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the current-member endpoint.
	pub fn identity_endpoint(mut self, url: Url) -> Self {
		self.identity_endpoint = Some(url);

		self
	}

	/// Adds a query parameter to every authorize URL.
	pub fn authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.insert(key.into(), value.into());

		self
	}

	/// Overrides the signature method (defaults to `HMAC-SHA1`).
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let endpoints = ProviderEndpoints {
			request_token: required("request_token", self.request_token_endpoint)?,
			authorize: required("authorize", self.authorize_endpoint)?,
			access_token: required("access_token", self.access_token_endpoint)?,
			identity: required("identity", self.identity_endpoint)?,
		};

		if let Some(name) = self.authorize_params.keys().find(|k| k.starts_with("oauth_")) {
			return Err(ProviderDescriptorError::ReservedAuthorizeParam { name: name.clone() });
		}

		Ok(ProviderDescriptor {
			id: self.id,
			endpoints,
			authorize_params: self.authorize_params,
			signature_method: self.signature_method,
		})
	}
}

fn required(endpoint: &'static str, url: Option<Url>) -> Result<Url, ProviderDescriptorError> {
	let url = url.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint })?;

	match url.scheme() {
		"https" => Ok(url),
		"http" if is_loopback(&url) => Ok(url),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { endpoint, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptor::builder(
			ProviderId::new("fixture").expect("Provider id fixture should be valid."),
		)
		.request_token_endpoint(url("https://provider.example.com/request"))
		.authorize_endpoint(url("https://provider.example.com/authorize"))
		.access_token_endpoint(url("https://provider.example.com/access"))
		.identity_endpoint(url("https://api.provider.example.com/me"))
	}

	#[test]
	fn rejects_missing_and_insecure_endpoints() {
		let err = ProviderDescriptor::builder(
			ProviderId::new("empty").expect("Provider id fixture should be valid."),
		)
		.build()
		.expect_err("Descriptor without endpoints must fail.");

		assert_eq!(err, ProviderDescriptorError::MissingEndpoint { endpoint: "request_token" });

		let err = builder()
			.access_token_endpoint(url("http://provider.example.com/access"))
			.build()
			.expect_err("Plain HTTP must be rejected for remote hosts.");

		assert!(matches!(
			err,
			ProviderDescriptorError::InsecureEndpoint { endpoint: "access_token", .. }
		));
	}

	#[test]
	fn loopback_http_is_allowed() {
		let descriptor = builder()
			.request_token_endpoint(url("http://127.0.0.1:8089/request"))
			.identity_endpoint(url("http://localhost:8089/me"))
			.build()
			.expect("Loopback HTTP endpoints should be accepted.");

		assert_eq!(descriptor.endpoints.request_token.port(), Some(8089));
	}

	#[test]
	fn oauth_prefixed_authorize_params_are_reserved() {
		let err = builder()
			.authorize_param("oauth_token", "spoofed")
			.build()
			.expect_err("Protocol parameters cannot be overridden.");

		assert_eq!(
			err,
			ProviderDescriptorError::ReservedAuthorizeParam { name: "oauth_token".into() }
		);
	}
}
