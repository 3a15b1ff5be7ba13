//! Optional observability helpers for gatekeeper flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth1_gatekeeper.flow` with the `flow`
//!   and `stage` (call site) fields, plus `warn` events under the
//!   `oauth1_gatekeeper::security` target for forged, replayed, or rejected credentials.
//! - Enable `metrics` to increment `oauth1_gatekeeper_flow_total` (labeled by `flow` and
//!   `outcome`) and `oauth1_gatekeeper_security_event_total` (labeled by `event`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gatekeeper flows observed by spans and counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Request token issuance and authorize URL construction.
	BeginHandshake,
	/// Verifier exchange for an access credential.
	CompleteHandshake,
	/// Full callback handling: exchange, identity lookup, persistence, and session issuance.
	Login,
	/// Session verification performed by the gate.
	SessionVerify,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::BeginHandshake => "begin_handshake",
			FlowKind::CompleteHandshake => "complete_handshake",
			FlowKind::Login => "login",
			FlowKind::SessionVerify => "session_verify",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a gatekeeper flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Security-relevant events worth alerting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityEvent {
	/// Callback presented a request token that is not pending (forged, replayed, or expired).
	UnknownRequestToken,
	/// A protected call arrived without a session token.
	MissingSession,
	/// A presented session token failed verification.
	InvalidSession,
	/// A valid session token named a member the store does not know.
	UnknownMember,
}
impl SecurityEvent {
	/// Returns a stable label suitable for log or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SecurityEvent::UnknownRequestToken => "unknown_request_token",
			SecurityEvent::MissingSession => "missing_session",
			SecurityEvent::InvalidSession => "invalid_session",
			SecurityEvent::UnknownMember => "unknown_member",
		}
	}
}
impl Display for SecurityEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Logs and counts a security event. `detail` must never carry secrets.
pub fn record_security_event(event: SecurityEvent, detail: &str) {
	#[cfg(feature = "tracing")]
	::tracing::warn!(
		target: "oauth1_gatekeeper::security",
		event = event.as_str(),
		detail,
		"Security event recorded."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = detail;

	record_security_metric(event);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_snake_case() {
		assert_eq!(FlowKind::CompleteHandshake.to_string(), "complete_handshake");
		assert_eq!(FlowOutcome::Failure.to_string(), "failure");
		assert_eq!(SecurityEvent::UnknownRequestToken.to_string(), "unknown_request_token");
	}

	#[test]
	fn security_events_do_not_panic_without_subscribers() {
		record_security_event(SecurityEvent::InvalidSession, "signature mismatch");
	}
}
