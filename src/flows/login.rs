//! Login orchestration: callback redemption through session issuance.
//!
//! [`Gatekeeper::complete_login`] runs the full callback path: redeem the request token,
//! resolve the member identity, upsert the member record, and sign a session token. Any
//! failure aborts the login; the request token is already consumed at that point, so the
//! client has to restart from [`Gatekeeper::begin_login`].

// self
use crate::{
	_prelude::*,
	auth::Member,
	flows::Gatekeeper,
	gate::AuthRejection,
	obs::{FlowKind, FlowSpan},
	session::IssuedSession,
};

/// Result of a completed login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
	/// Member record as persisted.
	pub member: Member,
	/// Session token handed back to the client.
	pub session: IssuedSession,
}

impl Gatekeeper {
	/// Starts a login and returns the provider authorize URL to redirect the client to.
	pub async fn begin_login(&self) -> Result<Url> {
		self.handshake.begin(self.callback()).await
	}

	/// Completes a login from the provider callback parameters.
	pub async fn complete_login(&self, request_token: &str, verifier: &str) -> Result<LoginOutcome> {
		FlowSpan::new(FlowKind::Login, "complete_login")
			.run(async move {
				let credential = self.handshake.complete(request_token, verifier).await?;
				let member_id = self.handshake.provider().who_am_i(&credential).await?;
				let member = Member::new(member_id, credential);

				self.store.save_member(member.clone()).await?;

				let session = self.sessions.issue(&member.id)?;

				#[cfg(feature = "tracing")]
				tracing::info!(member = %member.id, "Member logged in.");

				Ok(LoginOutcome { member, session })
			})
			.await
	}

	/// Resolves the member behind a presented session token (raw header value).
	pub async fn authenticate(&self, presented: Option<&str>) -> Result<Member, AuthRejection> {
		self.gate.authorize(presented).await
	}
}
