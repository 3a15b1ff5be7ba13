//! Signed session tokens binding a caller to a stored member.
//!
//! Tokens are compact JWTs signed with HMAC-SHA256 under a process-wide secret. The accepted
//! algorithm is fixed; a token whose header names anything else (including `none`) fails with
//! [`SessionError::InvalidSignature`] before any claim is read.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
	Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind as JwtErrorKind,
};
// self
use crate::{_prelude::*, auth::MemberId};

/// Lifetime of an issued session token unless overridden.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

const ALGORITHM: Algorithm = Algorithm::HS256;
const ALGORITHM_NAME: &str = "HS256";

/// Verification and issuance failures.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// Token is not a structurally valid signed token.
	#[error("Session token is malformed.")]
	Malformed,
	/// Signature does not verify, or the header names an unexpected algorithm.
	#[error("Session token signature is invalid.")]
	InvalidSignature,
	/// Token lifetime has elapsed.
	#[error("Session token has expired.")]
	Expired,
	/// Token could not be signed.
	#[error("Session token could not be signed.")]
	Signing {
		/// Underlying encoder failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}

/// Claims carried inside a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	/// Member the session belongs to.
	#[serde(rename = "sub")]
	pub member_id: MemberId,
	/// Issue time, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry time, seconds since the Unix epoch.
	pub exp: i64,
}

/// Freshly signed session handed back to the client after login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedSession {
	/// Encoded token to present on protected calls.
	pub token: String,
	/// Member the token was issued for.
	pub member_id: MemberId,
	/// Instant after which the token is rejected.
	pub expires_at: OffsetDateTime,
}

#[derive(Deserialize)]
struct HeaderPeek {
	alg: String,
}

/// Issues and verifies session tokens under one signing secret.
#[derive(Clone)]
pub struct SessionTokenService {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	ttl: Duration,
}
impl SessionTokenService {
	/// Creates a service signing with `secret` and the default 24 hour lifetime.
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		let secret = secret.as_ref();

		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			ttl: DEFAULT_SESSION_TTL,
		}
	}

	/// Overrides the token lifetime.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Token lifetime applied by [`SessionTokenService::issue`].
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Signs a session for `member_id` valid from now.
	pub fn issue(&self, member_id: &MemberId) -> Result<IssuedSession, SessionError> {
		self.issue_at(member_id, OffsetDateTime::now_utc())
	}

	/// Signs a session for `member_id` as if issued at `now`.
	pub fn issue_at(
		&self,
		member_id: &MemberId,
		now: OffsetDateTime,
	) -> Result<IssuedSession, SessionError> {
		let expires_at = now + self.ttl;
		let claims = SessionClaims {
			member_id: member_id.clone(),
			iat: now.unix_timestamp(),
			exp: expires_at.unix_timestamp(),
		};
		let token = jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
			.map_err(|source| SessionError::Signing { source })?;

		Ok(IssuedSession { token, member_id: member_id.clone(), expires_at })
	}

	/// Verifies `token` against the current time and returns the member it names.
	pub fn verify(&self, token: &str) -> Result<MemberId, SessionError> {
		self.verify_at(token, OffsetDateTime::now_utc())
	}

	/// Verifies `token` as of `now`. Member existence is not checked here.
	pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<MemberId, SessionError> {
		if peek_algorithm(token)? != ALGORITHM_NAME {
			return Err(SessionError::InvalidSignature);
		}

		let mut validation = Validation::new(ALGORITHM);

		// Expiry is checked below against the injected clock, without leeway.
		validation.validate_exp = false;
		validation.set_required_spec_claims(&["sub", "exp"]);

		let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
			.map_err(|e| match e.kind() {
				// Header and claims already decoded in `peek_algorithm`; a base64 failure here
				// comes from the signature segment.
				JwtErrorKind::InvalidSignature
				| JwtErrorKind::InvalidAlgorithm
				| JwtErrorKind::Base64(_) => SessionError::InvalidSignature,
				JwtErrorKind::ExpiredSignature => SessionError::Expired,
				_ => SessionError::Malformed,
			})?;

		if now.unix_timestamp() >= data.claims.exp {
			return Err(SessionError::Expired);
		}

		Ok(data.claims.member_id)
	}
}
impl Debug for SessionTokenService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTokenService")
			.field("algorithm", &ALGORITHM_NAME)
			.field("ttl", &self.ttl)
			.finish_non_exhaustive()
	}
}

// Checks the token shape and that header and claims decode, then returns the header `alg`.
fn peek_algorithm(token: &str) -> Result<String, SessionError> {
	let mut segments = token.split('.');
	let (Some(header), Some(claims), Some(_), None) =
		(segments.next(), segments.next(), segments.next(), segments.next())
	else {
		return Err(SessionError::Malformed);
	};
	let raw = URL_SAFE_NO_PAD.decode(header).map_err(|_| SessionError::Malformed)?;
	let peek: HeaderPeek = serde_json::from_slice(&raw).map_err(|_| SessionError::Malformed)?;

	URL_SAFE_NO_PAD.decode(claims).map_err(|_| SessionError::Malformed)?;

	Ok(peek.alg)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const SECRET: &[u8] = b"session-secret-for-tests-0123456789";

	fn member() -> MemberId {
		MemberId::new("5f1a2b3c").expect("Member id fixture should be valid.")
	}

	fn service() -> SessionTokenService {
		SessionTokenService::new(SECRET)
	}

	#[test]
	fn issued_tokens_verify_to_the_same_member() {
		let service = service();
		let session = service.issue(&member()).expect("Session should be signed.");

		assert_eq!(session.member_id, member());
		assert_eq!(service.verify(&session.token).expect("Fresh session should verify."), member());
	}

	#[test]
	fn expiry_follows_the_configured_ttl() {
		let now = datetime!(2025-01-01 00:00 UTC);
		let session = service().issue_at(&member(), now).expect("Session should be signed.");

		assert_eq!(session.expires_at, datetime!(2025-01-02 00:00 UTC));

		let short = service()
			.with_ttl(Duration::minutes(5))
			.issue_at(&member(), now)
			.expect("Session should be signed.");

		assert_eq!(short.expires_at, datetime!(2025-01-01 00:05 UTC));
	}

	#[test]
	fn altered_signature_is_rejected() {
		let service = service();
		let session = service.issue(&member()).expect("Session should be signed.");
		let (head, signature) =
			session.token.rsplit_once('.').expect("Token should have a signature segment.");
		let replacement = if signature.starts_with('A') { 'B' } else { 'A' };
		let forged = format!("{head}.{replacement}{}", &signature[1..]);

		assert!(matches!(service.verify(&forged), Err(SessionError::InvalidSignature)));
	}

	#[test]
	fn tampered_signature_tails_are_invalid_not_malformed() {
		let service = service();
		let session = service.issue(&member()).expect("Session should be signed.");
		let (head, signature) =
			session.token.rsplit_once('.').expect("Token should have a signature segment.");
		let body = &signature[..signature.len() - 1];

		for last in ['A', 'B', 'C', 'D', '!'] {
			let forged = format!("{head}.{body}{last}");

			if forged == session.token {
				continue;
			}

			assert!(
				matches!(service.verify(&forged), Err(SessionError::InvalidSignature)),
				"Signature ending in `{last}` should be invalid."
			);
		}

		let truncated = format!("{head}.{}", &signature[..signature.len() - 2]);

		assert!(matches!(service.verify(&truncated), Err(SessionError::InvalidSignature)));
		assert!(matches!(service.verify(&format!("{head}.")), Err(SessionError::InvalidSignature)));
	}

	#[test]
	fn undecodable_claims_are_malformed() {
		let service = service();
		let session = service.issue(&member()).expect("Session should be signed.");
		let mut segments = session.token.split('.');
		let header = segments.next().expect("Token should have a header segment.");
		let signature = segments.nth(1).expect("Token should have a signature segment.");

		assert!(matches!(
			service.verify(&format!("{header}.!!!.{signature}")),
			Err(SessionError::Malformed)
		));
	}

	#[test]
	fn other_secrets_do_not_verify() {
		let session = SessionTokenService::new(b"another-secret-of-enough-length")
			.issue(&member())
			.expect("Session should be signed.");

		assert!(matches!(service().verify(&session.token), Err(SessionError::InvalidSignature)));
	}

	#[test]
	fn unsigned_tokens_are_rejected() {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"5f1a2b3c","iat":0,"exp":9999999999}"#);
		let token = format!("{header}.{claims}.");

		assert!(matches!(service().verify(&token), Err(SessionError::InvalidSignature)));
	}

	#[test]
	fn other_algorithms_are_rejected_even_with_the_right_secret() {
		let claims = SessionClaims { member_id: member(), iat: 0, exp: 9_999_999_999 };
		let token = jsonwebtoken::encode(
			&Header::new(Algorithm::HS512),
			&claims,
			&EncodingKey::from_secret(SECRET),
		)
		.expect("HS512 fixture should encode.");

		assert!(matches!(service().verify(&token), Err(SessionError::InvalidSignature)));
	}

	#[test]
	fn garbage_is_malformed() {
		let service = service();

		for token in ["", "not-a-token", "a.b", "a.b.c.d", "!!!.e30.sig"] {
			assert!(
				matches!(service.verify(token), Err(SessionError::Malformed)),
				"`{token}` should be malformed."
			);
		}
	}

	#[test]
	fn tokens_expire_exactly_at_exp() {
		let service = service();
		let issued_at = datetime!(2025-03-01 12:00 UTC);
		let session = service.issue_at(&member(), issued_at).expect("Session should be signed.");

		service
			.verify_at(&session.token, session.expires_at - Duration::seconds(1))
			.expect("Session should be valid one second before expiry.");

		assert!(matches!(
			service.verify_at(&session.token, session.expires_at),
			Err(SessionError::Expired)
		));
	}

	#[test]
	fn sessions_issued_a_day_ago_are_expired() {
		let service = service();
		let session = service
			.issue_at(&member(), OffsetDateTime::now_utc() - Duration::hours(25))
			.expect("Session should be signed.");

		assert!(matches!(service.verify(&session.token), Err(SessionError::Expired)));
	}
}
