//! In-process provider simulator for tests and offline demos.
//!
//! [`MemoryIdentityProvider`] mimics the three OAuth 1.0a round-trips without any network:
//! request tokens are minted on demand, [`MemoryIdentityProvider::authorize`] plays the part of
//! the resource owner approving a token, and exchanged access tokens resolve back to the member
//! that approved them.

// std
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, MemberId, TokenSecret},
	error::ProviderError,
	provider::{IdentityProvider, ProviderFuture, ProviderStage, RequestTokenGrant},
};

const SECRET_LEN: usize = 24;

#[derive(Debug)]
struct IssuedRequestToken {
	secret: TokenSecret,
	approval: Option<Approval>,
}

#[derive(Debug)]
struct Approval {
	member: MemberId,
	verifier: String,
}

#[derive(Debug, Default)]
struct State {
	request_tokens: HashMap<String, IssuedRequestToken>,
	access_tokens: HashMap<String, MemberId>,
	failures: HashMap<ProviderStage, u16>,
}

#[derive(Debug, Default)]
struct CallCounters {
	request_token: AtomicUsize,
	access_token: AtomicUsize,
	identity: AtomicUsize,
}
impl CallCounters {
	fn bump(&self, stage: ProviderStage) {
		let counter = match stage {
			ProviderStage::RequestToken => &self.request_token,
			ProviderStage::AccessToken => &self.access_token,
			ProviderStage::Identity => &self.identity,
		};

		counter.fetch_add(1, Ordering::SeqCst);
	}
}

/// Provider simulator keeping every token in process memory.
#[derive(Debug)]
pub struct MemoryIdentityProvider {
	authorize_endpoint: Url,
	sequence: AtomicU64,
	calls: CallCounters,
	state: Mutex<State>,
}
impl MemoryIdentityProvider {
	/// Creates a simulator whose authorize URLs point at `authorize_endpoint`.
	pub fn new(authorize_endpoint: Url) -> Self {
		Self {
			authorize_endpoint,
			sequence: AtomicU64::new(1),
			calls: CallCounters::default(),
			state: Mutex::new(State::default()),
		}
	}

	/// Approves `request_token` on behalf of `member` and returns the verifier the provider
	/// would append to the callback. `None` when the token was never issued or already used.
	pub fn authorize(&self, request_token: &str, member: MemberId) -> Option<String> {
		let verifier = format!("verifier-{}", self.next_seq());
		let mut state = self.state.lock();
		let issued = state.request_tokens.get_mut(request_token)?;

		issued.approval = Some(Approval { member, verifier: verifier.clone() });

		Some(verifier)
	}

	/// Makes the next call for `stage` fail with an HTTP `503` rejection.
	pub fn fail_next(&self, stage: ProviderStage) {
		self.state.lock().failures.insert(stage, 503);
	}

	/// Number of request-token calls received.
	pub fn request_token_calls(&self) -> usize {
		self.calls.request_token.load(Ordering::SeqCst)
	}

	/// Number of verifier exchange calls received.
	pub fn exchange_calls(&self) -> usize {
		self.calls.access_token.load(Ordering::SeqCst)
	}

	/// Number of identity lookups received.
	pub fn identity_calls(&self) -> usize {
		self.calls.identity.load(Ordering::SeqCst)
	}

	fn next_seq(&self) -> u64 {
		self.sequence.fetch_add(1, Ordering::SeqCst)
	}

	fn enter(&self, stage: ProviderStage) -> Result<(), ProviderError> {
		self.calls.bump(stage);

		match self.state.lock().failures.remove(&stage) {
			Some(status) => Err(ProviderError::Rejected {
				stage,
				status,
				body: "simulated provider failure".into(),
			}),
			None => Ok(()),
		}
	}
}
impl IdentityProvider for MemoryIdentityProvider {
	fn get_request_token<'a>(&'a self, callback: &'a Url) -> ProviderFuture<'a, RequestTokenGrant> {
		Box::pin(async move {
			self.enter(ProviderStage::RequestToken)?;

			let token = format!("rt-{}", self.next_seq());
			let secret = TokenSecret::new(random_secret());
			let mut authorize_url = self.authorize_endpoint.clone();

			authorize_url
				.query_pairs_mut()
				.append_pair("oauth_token", &token)
				.append_pair("oauth_callback", callback.as_str());
			self.state.lock().request_tokens.insert(
				token.clone(),
				IssuedRequestToken { secret: secret.clone(), approval: None },
			);

			Ok(RequestTokenGrant { token, secret, authorize_url })
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

			self.enter(STAGE)?;

			let mut state = self.state.lock();
			// Providers burn the request token on every exchange attempt.
			let issued = state.request_tokens.remove(token).ok_or_else(|| rejected(STAGE))?;
			let approval = issued.approval.ok_or_else(|| rejected(STAGE))?;

			if issued.secret != *secret || approval.verifier != verifier {
				return Err(rejected(STAGE));
			}

			let access_token = format!("at-{}", self.next_seq());

			state.access_tokens.insert(access_token.clone(), approval.member);

			Ok(AccessCredential::new(access_token, random_secret()))
		})
	}

	fn who_am_i<'a>(&'a self, credential: &'a AccessCredential) -> ProviderFuture<'a, MemberId> {
		Box::pin(async move {
			self.enter(ProviderStage::Identity)?;

			self.state
				.lock()
				.access_tokens
				.get(&credential.token)
				.cloned()
				.ok_or_else(|| rejected(ProviderStage::Identity))
		})
	}
}

fn rejected(stage: ProviderStage) -> ProviderError {
	ProviderError::Rejected { stage, status: 401, body: "invalid token".into() }
}

fn random_secret() -> String {
	rand::rng().sample_iter(Alphanumeric).take(SECRET_LEN).map(char::from).collect()
}
