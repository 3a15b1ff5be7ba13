//! Session gate in front of member-only operations.
//!
//! [`AuthGate`] turns a presented session token into the stored [`Member`] it names. Every
//! failure, storage errors included, becomes an [`AuthRejection`] that surfaces as HTTP `401`
//! so callers cannot probe which check failed. The gate never writes to the store.

// self
use crate::{
	_prelude::*,
	auth::{Member, MemberId},
	obs::{self, FlowKind, FlowSpan, SecurityEvent},
	session::{SessionError, SessionTokenService},
	store::{CredentialStore, StoreError},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Reasons a protected call was refused.
#[derive(Debug, ThisError)]
pub enum AuthRejection {
	/// No session token was presented.
	#[error("Session token is missing.")]
	MissingToken,
	/// The presented token failed verification.
	#[error(transparent)]
	InvalidSession(#[from] SessionError),
	/// The token is valid but names a member the store does not know.
	#[error("Session names unknown member {member}.")]
	UnknownMember {
		/// Member named by the token.
		member: MemberId,
	},
	/// The store could not be consulted.
	#[error("Credential store is unavailable.")]
	Storage(#[source] StoreError),
}
impl AuthRejection {
	/// HTTP status every rejection surfaces as.
	pub const fn http_status(&self) -> u16 {
		401
	}
}

/// Verifies session tokens and loads the member they name.
#[derive(Clone)]
pub struct AuthGate {
	sessions: Arc<SessionTokenService>,
	store: Arc<dyn CredentialStore>,
}
impl AuthGate {
	/// Creates a gate over the given session service and store.
	pub fn new(sessions: Arc<SessionTokenService>, store: Arc<dyn CredentialStore>) -> Self {
		Self { sessions, store }
	}

	/// Resolves the member behind `presented`, the raw session header value if any.
	///
	/// A `Bearer ` prefix is accepted but not required.
	pub async fn authorize(&self, presented: Option<&str>) -> Result<Member, AuthRejection> {
		FlowSpan::new(FlowKind::SessionVerify, "authorize")
			.run(async move {
				let Some(token) = presented.and_then(extract_bearer) else {
					obs::record_security_event(
						SecurityEvent::MissingSession,
						"protected call without a session token",
					);

					return Err(AuthRejection::MissingToken);
				};
				let member_id = self.sessions.verify(token).map_err(|e| {
					obs::record_security_event(SecurityEvent::InvalidSession, &e.to_string());

					AuthRejection::InvalidSession(e)
				})?;

				match self.store.get_member(&member_id).await {
					Ok(Some(member)) => Ok(member),
					Ok(None) => {
						obs::record_security_event(
							SecurityEvent::UnknownMember,
							"session names a member that is not stored",
						);

						Err(AuthRejection::UnknownMember { member: member_id })
					},
					Err(e) => {
						#[cfg(feature = "tracing")]
						tracing::error!(error = %e, "Credential store failed during session check.");

						Err(AuthRejection::Storage(e))
					},
				}
			})
			.await
	}

	/// Runs `op` with the resolved member, or returns the rejection without calling it.
	pub async fn protect<F, Fut, T>(&self, presented: Option<&str>, op: F) -> Result<T, AuthRejection>
	where
		F: FnOnce(Member) -> Fut,
		Fut: Future<Output = T>,
	{
		let member = self.authorize(presented).await?;

		Ok(op(member).await)
	}
}
impl Debug for AuthGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthGate").field("sessions", &self.sessions).finish_non_exhaustive()
	}
}

/// Extracts the token from a header value, stripping an optional `Bearer ` prefix.
///
/// Returns `None` for blank values and for a bare `Bearer` scheme without a token.
pub fn extract_bearer(value: &str) -> Option<&str> {
	let value = value.trim_start();
	let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();

	if token.is_empty() || token.eq_ignore_ascii_case(BEARER_PREFIX.trim_end()) {
		None
	} else {
		Some(token)
	}
}
