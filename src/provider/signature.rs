//! OAuth 1.0a request signing (RFC 5849 section 3).
//!
//! Every provider round-trip is authenticated with an `Authorization: OAuth ...` header built
//! from the consumer credentials, an optional token, a fresh nonce/timestamp pair, and a
//! signature over the normalized request. Provider calls carry no body, so the query string and
//! the protocol parameters are the whole signature base string.

// std
use std::borrow::Cow;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::TokenSecret};

const NONCE_LEN: usize = 32;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Signature methods defined for OAuth 1.0a.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// HMAC over SHA-1, the method every OAuth 1.0a provider supports.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// HMAC over SHA-256.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
	/// Sends the signing key itself; only safe over TLS.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the `oauth_signature_method` value.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::HmacSha1 => "HMAC-SHA1",
			SignatureMethod::HmacSha256 => "HMAC-SHA256",
			SignatureMethod::Plaintext => "PLAINTEXT",
		}
	}
}

/// Application (consumer) key and secret issued by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerCredentials {
	/// Public consumer key (`oauth_consumer_key`).
	pub key: String,
	/// Consumer secret; half of every signing key.
	pub secret: TokenSecret,
}
impl ConsumerCredentials {
	/// Wraps a consumer key/secret pair.
	pub fn new(key: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self { key: key.into(), secret: secret.into() }
	}

	/// Signs `request` with a fresh nonce and the current timestamp.
	pub fn authorization_header(&self, method: SignatureMethod, request: &OAuthRequest) -> String {
		let nonce: String =
			rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect();

		self.authorization_header_at(
			method,
			request,
			&nonce,
			OffsetDateTime::now_utc().unix_timestamp(),
		)
	}

	/// Signs `request` with caller-supplied nonce and timestamp.
	pub fn authorization_header_at(
		&self,
		method: SignatureMethod,
		request: &OAuthRequest,
		nonce: &str,
		timestamp: i64,
	) -> String {
		let timestamp = timestamp.to_string();
		let mut oauth = vec![
			("oauth_consumer_key", self.key.as_str()),
			("oauth_nonce", nonce),
			("oauth_signature_method", method.as_str()),
			("oauth_timestamp", timestamp.as_str()),
			("oauth_version", "1.0"),
		];

		if let Some(token) = request.token {
			oauth.push(("oauth_token", token));
		}

		oauth.extend(request.oauth_params.iter().copied());

		let key = signing_key(&self.secret, request.token_secret);
		let signature = match method {
			SignatureMethod::Plaintext => key,
			SignatureMethod::HmacSha1 | SignatureMethod::HmacSha256 => {
				let base = signature_base_string(request.method, request.url, &oauth);

				if method == SignatureMethod::HmacSha1 {
					mac_base64::<HmacSha1>(key.as_bytes(), base.as_bytes())
				} else {
					mac_base64::<HmacSha256>(key.as_bytes(), base.as_bytes())
				}
			},
		};

		oauth.push(("oauth_signature", signature.as_str()));
		oauth.sort_unstable();

		let fields = oauth
			.iter()
			.map(|(name, value)| format!("{name}=\"{}\"", percent_encode(value)))
			.collect::<Vec<_>>()
			.join(", ");

		format!("OAuth {fields}")
	}
}

/// Request description fed to the signer.
#[derive(Clone, Debug)]
pub struct OAuthRequest<'a> {
	method: &'a str,
	url: &'a Url,
	token: Option<&'a str>,
	token_secret: Option<&'a TokenSecret>,
	oauth_params: Vec<(&'static str, &'a str)>,
}
impl<'a> OAuthRequest<'a> {
	/// Describes a request with the given HTTP method (upper case) and absolute URL.
	pub fn new(method: &'a str, url: &'a Url) -> Self {
		Self { method, url, token: None, token_secret: None, oauth_params: Vec::new() }
	}

	/// Signs on behalf of a request or access token.
	pub fn token(mut self, token: &'a str, secret: &'a TokenSecret) -> Self {
		self.token = Some(token);
		self.token_secret = Some(secret);

		self
	}

	/// Adds a protocol parameter such as `oauth_callback` or `oauth_verifier`.
	pub fn oauth_param(mut self, name: &'static str, value: &'a str) -> Self {
		self.oauth_params.push((name, value));

		self
	}
}

/// Builds the signature base string: `METHOD&base-uri&normalized-params`.
///
/// Query parameters from `url` are merged with `params`; every name and value is
/// percent-encoded before sorting.
pub fn signature_base_string(method: &str, url: &Url, params: &[(&str, &str)]) -> String {
	let mut base_uri = url.clone();

	base_uri.set_query(None);
	base_uri.set_fragment(None);

	let mut pairs: Vec<(String, String)> = url
		.query_pairs()
		.map(|(k, v)| (percent_encode(&k).into_owned(), percent_encode(&v).into_owned()))
		.chain(params.iter().map(|(k, v)| {
			(percent_encode(k).into_owned(), percent_encode(v).into_owned())
		}))
		.collect();

	pairs.sort_unstable();

	let normalized =
		pairs.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(base_uri.as_str()),
		percent_encode(&normalized)
	)
}

/// RFC 3986 percent-encoding: everything except `ALPHA / DIGIT / "-" / "." / "_" / "~"`.
pub fn percent_encode(value: &str) -> Cow<'_, str> {
	urlencoding::encode(value)
}

fn signing_key(consumer_secret: &TokenSecret, token_secret: Option<&TokenSecret>) -> String {
	format!(
		"{}&{}",
		percent_encode(consumer_secret.expose()),
		percent_encode(token_secret.map(TokenSecret::expose).unwrap_or_default())
	)
}

fn mac_base64<M>(key: &[u8], message: &[u8]) -> String
where
	M: Mac + hmac::digest::KeyInit,
{
	let mut mac =
		<M as Mac>::new_from_slice(key).expect("HMAC should accept signing keys of any length.");

	mac.update(message);

	STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse signing fixture URL.")
	}

	#[test]
	fn base_string_matches_rfc5849_example() {
		let url = url("http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b");
		let base = signature_base_string(
			"POST",
			&url,
			&[
				("oauth_consumer_key", "9djdj82h48djs9d2"),
				("oauth_token", "kkk9d7dh3k39sjv7"),
				("oauth_signature_method", "HMAC-SHA1"),
				("oauth_timestamp", "137131201"),
				("oauth_nonce", "7d8f3e4a"),
				("c2", ""),
				("a3", "2 q"),
			],
		);

		assert_eq!(
			base,
			"POST&http%3A%2F%2Fexample.com%2Frequest&a2%3Dr%2520b%26a3%3D2%2520q%26a3%3Da%26b5%3D%253D%25253D%26c%2540%3D%26c2%3D%26oauth_consumer_key%3D9djdj82h48djs9d2%26oauth_nonce%3D7d8f3e4a%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D137131201%26oauth_token%3Dkkk9d7dh3k39sjv7"
		);
	}

	#[test]
	fn hmac_sha1_header_is_stable_for_fixed_nonce() {
		let consumer = ConsumerCredentials::new("ck", "cs");
		let secret = TokenSecret::new("ts");
		let url = url("https://trello.com/1/members/me?fields=id");
		let request = OAuthRequest::new("GET", &url).token("tk", &secret);
		let header = consumer.authorization_header_at(
			SignatureMethod::HmacSha1,
			&request,
			"abc123",
			1_700_000_000,
		);

		assert_eq!(
			header,
			"OAuth oauth_consumer_key=\"ck\", oauth_nonce=\"abc123\", \
			 oauth_signature=\"3aQ%2FczX38P6dXuIHbbQ6Isz0s8I%3D\", \
			 oauth_signature_method=\"HMAC-SHA1\", oauth_timestamp=\"1700000000\", \
			 oauth_token=\"tk\", oauth_version=\"1.0\""
		);
	}

	#[test]
	fn hmac_sha256_uses_the_same_base_string() {
		let consumer = ConsumerCredentials::new("ck", "cs");
		let secret = TokenSecret::new("ts");
		let url = url("https://trello.com/1/members/me?fields=id");
		let request = OAuthRequest::new("GET", &url).token("tk", &secret);
		let header = consumer.authorization_header_at(
			SignatureMethod::HmacSha256,
			&request,
			"abc123",
			1_700_000_000,
		);

		assert!(header.contains(
			"oauth_signature=\"AAdKFT712Apfs%2Bsk9aMPU9v%2BcCgV3uck41pJ2GSahis%3D\""
		));
		assert!(header.contains("oauth_signature_method=\"HMAC-SHA256\""));
	}

	#[test]
	fn plaintext_signature_is_the_encoded_key() {
		let consumer = ConsumerCredentials::new("ck", "c&s");
		let url = url("https://provider.example.com/request");
		let request =
			OAuthRequest::new("POST", &url).oauth_param("oauth_callback", "https://app/cb");
		let header =
			consumer.authorization_header_at(SignatureMethod::Plaintext, &request, "n", 1);

		// Key is `c%26s&`; the header encodes it once more.
		assert!(header.contains("oauth_signature=\"c%2526s%26\""));
		assert!(header.contains("oauth_callback=\"https%3A%2F%2Fapp%2Fcb\""));
		assert!(!header.contains("oauth_token="));
	}

	#[test]
	fn fresh_headers_use_distinct_nonces() {
		let consumer = ConsumerCredentials::new("ck", "cs");
		let url = url("https://provider.example.com/request");
		let request = OAuthRequest::new("POST", &url);
		let first = consumer.authorization_header(SignatureMethod::HmacSha1, &request);
		let second = consumer.authorization_header(SignatureMethod::HmacSha1, &request);

		assert_ne!(first, second);
	}

	#[test]
	fn empty_signing_key_still_produces_a_signature() {
		let consumer = ConsumerCredentials::new("ck", "");
		let url = url("https://provider.example.com/request");
		let request = OAuthRequest::new("POST", &url);
		let header =
			consumer.authorization_header_at(SignatureMethod::HmacSha1, &request, "n", 1);
		let signature = header
			.split(", ")
			.find_map(|field| field.strip_prefix("oauth_signature=\""))
			.expect("Header should carry a signature field.");

		assert!(signature.len() > 1, "HMAC signature must never be empty: {header}");
	}

	#[test]
	fn query_parameters_are_signed() {
		let consumer = ConsumerCredentials::new("ck", "cs");
		let plain = url("https://provider.example.com/members/me");
		let with_query = url("https://provider.example.com/members/me?fields=id");
		let sign = |url: &Url| {
			consumer.authorization_header_at(
				SignatureMethod::HmacSha1,
				&OAuthRequest::new("GET", url),
				"n",
				1,
			)
		};

		assert_ne!(sign(&plain), sign(&with_query));
	}
}
