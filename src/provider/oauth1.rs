//! Reqwest-backed [`IdentityProvider`] speaking OAuth 1.0a.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::header::{ACCEPT, AUTHORIZATION};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, MemberId, TokenSecret},
	error::{ConfigError, ProviderError},
	http::ReqwestHttpClient,
	provider::{
		ConsumerCredentials, IdentityProvider, OAuthRequest, ProviderDescriptor, ProviderFuture,
		ProviderStage, RequestTokenGrant,
	},
};

/// Member document returned by the identity endpoint; only `id` is read.
#[derive(Deserialize)]
struct IdentityPayload {
	id: String,
}

/// OAuth 1.0a client bound to one provider descriptor and one consumer key.
#[derive(Clone, Debug)]
pub struct OAuth1Provider {
	descriptor: ProviderDescriptor,
	consumer: ConsumerCredentials,
	http: ReqwestHttpClient,
}
impl OAuth1Provider {
	/// Creates a provider client reusing the caller's transport.
	pub fn new(
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
		http: ReqwestHttpClient,
	) -> Self {
		Self { descriptor, consumer, http }
	}

	/// Creates a provider client with its own transport bounded by `timeout`.
	pub fn with_timeout(
		descriptor: ProviderDescriptor,
		consumer: ConsumerCredentials,
		timeout: StdDuration,
	) -> Result<Self, ConfigError> {
		Ok(Self::new(descriptor, consumer, ReqwestHttpClient::with_timeout(timeout)?))
	}

	fn sign(&self, request: &OAuthRequest) -> String {
		self.consumer.authorization_header(self.descriptor.signature_method, request)
	}

	async fn post_form(
		&self,
		stage: ProviderStage,
		url: &Url,
		request: OAuthRequest<'_>,
	) -> Result<BTreeMap<String, String>, ProviderError> {
		let header = self.sign(&request);
		let body = self
			.http
			.send(stage, self.http.post(url.clone()).header(AUTHORIZATION, header))
			.await?
			.into_success()?;

		Ok(form_urlencoded::parse(&body).into_owned().collect())
	}
}
impl IdentityProvider for OAuth1Provider {
	fn get_request_token<'a>(&'a self, callback: &'a Url) -> ProviderFuture<'a, RequestTokenGrant> {
		Box::pin(async move {
			const STAGE: ProviderStage = ProviderStage::RequestToken;

			let url = &self.descriptor.endpoints.request_token;
			let request = OAuthRequest::new("POST", url).oauth_param("oauth_callback", callback.as_str());
			let mut fields = self.post_form(STAGE, url, request).await?;

			// OAuth 1.0a providers must confirm the callback; 1.0 providers omit the field.
			match fields.remove("oauth_callback_confirmed").as_deref() {
				None | Some("true") => {},
				Some(other) => {
					return Err(ProviderError::MalformedResponse {
						stage: STAGE,
						reason: format!("oauth_callback_confirmed is `{other}`"),
					});
				},
			}

			let token = take_field(&mut fields, STAGE, "oauth_token")?;
			let secret = take_field(&mut fields, STAGE, "oauth_token_secret")?;
			let authorize_url = self.descriptor.authorize_url(&token);

			Ok(RequestTokenGrant { token, secret: TokenSecret::new(secret), authorize_url })
		})
	}

	fn exchange_token<'a>(
		&'a self,
		token: &'a str,
		secret: &'a TokenSecret,
		verifier: &'a str,
	) -> ProviderFuture<'a, AccessCredential> {
		Box::pin(async move {
			const STAGE: ProviderStage = ProviderStage::AccessToken;

			let url = &self.descriptor.endpoints.access_token;
			let request = OAuthRequest::new("POST", url)
				.token(token, secret)
				.oauth_param("oauth_verifier", verifier);
			let mut fields = self.post_form(STAGE, url, request).await?;
			let access_token = take_field(&mut fields, STAGE, "oauth_token")?;
			let access_secret = take_field(&mut fields, STAGE, "oauth_token_secret")?;

			Ok(AccessCredential {
				token: access_token,
				secret: TokenSecret::new(access_secret),
				additional_data: fields,
			})
		})
	}

	fn who_am_i<'a>(&'a self, credential: &'a AccessCredential) -> ProviderFuture<'a, MemberId> {
		Box::pin(async move {
			const STAGE: ProviderStage = ProviderStage::Identity;

			let url = &self.descriptor.endpoints.identity;
			let request = OAuthRequest::new("GET", url).token(&credential.token, &credential.secret);
			let header = self.sign(&request);
			let body = self
				.http
				.send(
					STAGE,
					self.http
						.get(url.clone())
						.header(AUTHORIZATION, header)
						.header(ACCEPT, "application/json"),
				)
				.await?
				.into_success()?;
			let de = &mut serde_json::Deserializer::from_slice(&body);
			let payload: IdentityPayload = serde_path_to_error::deserialize(de)
				.map_err(|source| ProviderError::IdentityParse { source })?;

			MemberId::new(payload.id).map_err(|e| ProviderError::MalformedResponse {
				stage: STAGE,
				reason: e.to_string(),
			})
		})
	}
}

fn take_field(
	fields: &mut BTreeMap<String, String>,
	stage: ProviderStage,
	name: &'static str,
) -> Result<String, ProviderError> {
	match fields.remove(name) {
		Some(value) if !value.is_empty() => Ok(value),
		_ => Err(ProviderError::MalformedResponse { stage, reason: format!("missing {name}") }),
	}
}
