//! Transport primitives for provider round-trips.
//!
//! [`ReqwestHttpClient`] owns the timeout and redirect policy for every call to the identity
//! provider and folds transport failures into [`ProviderError`] so provider clients only deal
//! with status codes and bodies.

// std
use std::{ops::Deref, time::Duration as StdDuration};
// crates.io
use reqwest::{RequestBuilder, redirect::Policy};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProviderError},
	provider::ProviderStage,
};

const BODY_PREVIEW_LEN: usize = 256;

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// OAuth 1.0a token endpoints answer directly, so clients built here never follow redirects.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client that aborts any provider call running longer than `timeout`.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Dispatches `request` and buffers the response body.
	pub async fn send(
		&self,
		stage: ProviderStage,
		request: RequestBuilder,
	) -> Result<ProviderResponse, ProviderError> {
		let response = request.send().await.map_err(|e| map_reqwest_error(stage, e))?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(|e| map_reqwest_error(stage, e))?.to_vec();

		#[cfg(feature = "tracing")]
		tracing::debug!(stage = stage.as_str(), status, "Provider call completed.");

		Ok(ProviderResponse { stage, status, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Buffered provider response.
#[derive(Clone, Debug)]
pub struct ProviderResponse {
	/// Stage the response belongs to.
	pub stage: ProviderStage,
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Returns the body for 2xx responses and [`ProviderError::Rejected`] otherwise.
	pub fn into_success(self) -> Result<Vec<u8>, ProviderError> {
		if (200..300).contains(&self.status) {
			return Ok(self.body);
		}

		let mut body = String::from_utf8_lossy(&self.body).into_owned();

		if body.len() > BODY_PREVIEW_LEN {
			let cut =
				(0..=BODY_PREVIEW_LEN).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);

			body.truncate(cut);
		}

		Err(ProviderError::Rejected { stage: self.stage, status: self.status, body })
	}
}

fn map_reqwest_error(stage: ProviderStage, err: ReqwestError) -> ProviderError {
	if err.is_timeout() {
		ProviderError::Timeout { stage }
	} else {
		ProviderError::network(stage, err)
	}
}
