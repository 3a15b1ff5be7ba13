//! Provider descriptor data structures shared by all provider clients.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ProviderId, provider::SignatureMethod};

const TRELLO_REQUEST_TOKEN: &str = "https://trello.com/1/OAuthGetRequestToken";
const TRELLO_AUTHORIZE: &str = "https://trello.com/1/OAuthAuthorizeToken";
const TRELLO_ACCESS_TOKEN: &str = "https://trello.com/1/OAuthGetAccessToken";
const TRELLO_IDENTITY: &str = "https://trello.com/1/members/me";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Temporary credential (request token) endpoint.
	pub request_token: Url,
	/// Resource-owner authorization page the client is redirected to.
	pub authorize: Url,
	/// Token endpoint exchanging a verified request token for an access credential.
	pub access_token: Url,
	/// Endpoint returning the authenticated member as `{ "id": ... }`.
	pub identity: Url,
}

/// Immutable provider descriptor consumed by provider clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Extra query parameters appended to the authorize URL.
	pub authorize_params: BTreeMap<String, String>,
	/// Signature method used for every signed request.
	pub signature_method: SignatureMethod,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Trello descriptor requesting a non-expiring read/write grant labelled `app_name`.
	pub fn trello(app_name: &str) -> Result<Self, ProviderDescriptorError> {
		let id = ProviderId::new("trello").map_err(ProviderDescriptorError::InvalidId)?;

		Self::builder(id)
			.request_token_endpoint(parse_preset(TRELLO_REQUEST_TOKEN)?)
			.authorize_endpoint(parse_preset(TRELLO_AUTHORIZE)?)
			.access_token_endpoint(parse_preset(TRELLO_ACCESS_TOKEN)?)
			.identity_endpoint(parse_preset(TRELLO_IDENTITY)?)
			.authorize_param("name", app_name)
			.authorize_param("expiration", "never")
			.authorize_param("scope", "read,write")
			.build()
	}

	/// Builds the URL a client must visit to approve `request_token`.
	pub fn authorize_url(&self, request_token: &str) -> Url {
		let mut url = self.endpoints.authorize.clone();

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair("oauth_token", request_token);

			for (key, value) in &self.authorize_params {
				pairs.append_pair(key, value);
			}
		}

		url
	}
}

fn parse_preset(raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|_| ProviderDescriptorError::InvalidEndpoint {
		endpoint: "preset",
		url: raw.to_owned(),
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn trello_preset_carries_authorize_params() {
		let descriptor =
			ProviderDescriptor::trello("Trello Regexp").expect("Trello preset should build.");
		let url = descriptor.authorize_url("request-abc");
		let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(url.path(), "/1/OAuthAuthorizeToken");
		assert_eq!(pairs.get("oauth_token"), Some(&"request-abc".into()));
		assert_eq!(pairs.get("name"), Some(&"Trello Regexp".into()));
		assert_eq!(pairs.get("expiration"), Some(&"never".into()));
		assert_eq!(pairs.get("scope"), Some(&"read,write".into()));
		assert_eq!(descriptor.signature_method, SignatureMethod::HmacSha1);
		assert_eq!(descriptor.endpoints.identity.as_str(), TRELLO_IDENTITY);
	}
}
