// std
use std::sync::Arc;
// crates.io
use url::Url;
// self
use oauth1_gatekeeper::{
	auth::MemberId,
	error::Error,
	flows::Gatekeeper,
	gate::AuthRejection,
	provider::{MemoryIdentityProvider, ProviderStage},
	session::{SessionError, SessionTokenService},
	store::{CredentialStore, MemoryStore},
};

const SESSION_SECRET: &[u8] = b"login-it-session-secret-0123456789";

struct Harness {
	gatekeeper: Gatekeeper,
	provider: Arc<MemoryIdentityProvider>,
	store: MemoryStore,
}

fn harness() -> Harness {
	let provider = Arc::new(MemoryIdentityProvider::new(
		Url::parse("https://provider.test/1/OAuthAuthorizeToken")
			.expect("Authorize endpoint fixture should parse."),
	));
	let store = MemoryStore::default();
	let gatekeeper = Gatekeeper::new(
		provider.clone(),
		Arc::new(store.clone()),
		SessionTokenService::new(SESSION_SECRET),
		Url::parse("http://localhost:8080/auth/callback").expect("Callback fixture should parse."),
	);

	Harness { gatekeeper, provider, store }
}

fn member_id(value: &str) -> MemberId {
	MemberId::new(value).expect("Member id fixture should be valid.")
}

fn request_token(authorize_url: &Url) -> String {
	authorize_url
		.query_pairs()
		.find(|(k, _)| k == "oauth_token")
		.map(|(_, v)| v.into_owned())
		.expect("Authorize URL should carry oauth_token.")
}

async fn approve(h: &Harness, member: &str) -> (String, String) {
	let url = h.gatekeeper.begin_login().await.expect("Login should begin.");
	let token = request_token(&url);
	let verifier =
		h.provider.authorize(&token, member_id(member)).expect("Issued token should be approvable.");

	(token, verifier)
}

#[tokio::test]
async fn full_login_resolves_the_same_member_through_the_gate() {
	let h = harness();
	let (token, verifier) = approve(&h, "5f1a2b3c").await;
	let outcome =
		h.gatekeeper.complete_login(&token, &verifier).await.expect("Login should complete.");

	assert_eq!(outcome.member.id, member_id("5f1a2b3c"));
	assert_eq!(
		h.store.get_member(&outcome.member.id).await.expect("Lookup should succeed."),
		Some(outcome.member.clone())
	);

	let header = format!("Bearer {}", outcome.session.token);
	let resolved =
		h.gatekeeper.authenticate(Some(&header)).await.expect("Fresh session should pass the gate.");

	assert_eq!(resolved, outcome.member);
	assert!(h.gatekeeper.handshake.pending().is_empty());
}

#[tokio::test]
async fn relogin_replaces_the_credential_but_keeps_the_member() {
	let h = harness();
	let (token, verifier) = approve(&h, "member-9").await;
	let first = h.gatekeeper.complete_login(&token, &verifier).await.expect("First login.");
	let (token, verifier) = approve(&h, "member-9").await;
	let second = h.gatekeeper.complete_login(&token, &verifier).await.expect("Second login.");

	assert_eq!(first.member.id, second.member.id);
	assert_ne!(first.member.access_credential.token, second.member.access_credential.token);
	assert_eq!(h.store.len(), 1);
	assert_eq!(
		h.store
			.get_member(&second.member.id)
			.await
			.expect("Lookup should succeed.")
			.expect("Member should be stored.")
			.access_credential,
		second.member.access_credential
	);
}

#[tokio::test]
async fn replayed_callbacks_are_unknown() {
	let h = harness();
	let (token, verifier) = approve(&h, "member-1").await;

	h.gatekeeper.complete_login(&token, &verifier).await.expect("First callback should succeed.");

	let err = h
		.gatekeeper
		.complete_login(&token, &verifier)
		.await
		.expect_err("Replayed callback must be rejected.");

	assert!(matches!(err, Error::UnknownRequestToken));
	assert_eq!(err.http_status(), 500);
	assert_eq!(h.provider.exchange_calls(), 1);
}

#[tokio::test]
async fn forged_callbacks_never_reach_the_provider() {
	let h = harness();
	let err = h
		.gatekeeper
		.complete_login("rt-forged", "verifier-forged")
		.await
		.expect_err("Never-issued token must be rejected.");

	assert!(matches!(err, Error::UnknownRequestToken));
	assert_eq!(h.provider.exchange_calls(), 0);
	assert_eq!(h.provider.identity_calls(), 0);
}

#[tokio::test]
async fn identity_failures_abort_the_login_without_persisting() {
	let h = harness();
	let (token, verifier) = approve(&h, "member-2").await;

	h.provider.fail_next(ProviderStage::Identity);

	let err = h
		.gatekeeper
		.complete_login(&token, &verifier)
		.await
		.expect_err("Identity failure should abort the login.");

	assert!(matches!(err, Error::Provider(ref e) if e.stage() == ProviderStage::Identity));
	assert!(h.store.is_empty());
	assert!(matches!(
		h.gatekeeper.complete_login(&token, &verifier).await,
		Err(Error::UnknownRequestToken)
	));
}

#[tokio::test]
async fn expired_pending_tokens_are_unknown() {
	let h = harness();
	let gatekeeper = h.gatekeeper.clone().with_pending_ttl(time::Duration::ZERO);
	let url = gatekeeper.begin_login().await.expect("Login should begin.");
	let token = request_token(&url);
	let verifier =
		h.provider.authorize(&token, member_id("member-3")).expect("Token should be approvable.");

	assert!(matches!(
		gatekeeper.complete_login(&token, &verifier).await,
		Err(Error::UnknownRequestToken)
	));
	assert_eq!(h.provider.exchange_calls(), 0);
}

#[tokio::test]
async fn gate_rejects_missing_malformed_expired_and_unknown_tokens() {
	let h = harness();
	let sessions = SessionTokenService::new(SESSION_SECRET);
	let expired = sessions
		.issue_at(&member_id("member-4"), time::OffsetDateTime::now_utc() - time::Duration::days(2))
		.expect("Expired session fixture should sign.");
	let unknown = sessions.issue(&member_id("ghost")).expect("Session fixture should sign.");

	assert!(matches!(h.gatekeeper.authenticate(None).await, Err(AuthRejection::MissingToken)));
	assert!(matches!(
		h.gatekeeper.authenticate(Some("Bearer not.a.token")).await,
		Err(AuthRejection::InvalidSession(SessionError::Malformed))
	));
	assert!(matches!(
		h.gatekeeper.authenticate(Some(&expired.token)).await,
		Err(AuthRejection::InvalidSession(SessionError::Expired))
	));
	assert!(matches!(
		h.gatekeeper.authenticate(Some(&unknown.token)).await,
		Err(AuthRejection::UnknownMember { .. })
	));
}
