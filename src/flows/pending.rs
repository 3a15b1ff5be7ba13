//! In-memory table of request tokens awaiting the provider callback.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// How long an unanswered request token stays redeemable unless overridden.
pub const DEFAULT_PENDING_TTL: Duration = Duration::minutes(15);

/// Request token issued by the provider and not yet exchanged.
#[derive(Clone)]
pub struct PendingRequestToken {
	/// Request token value; the table key.
	pub token: String,
	/// Request token secret needed to sign the exchange.
	pub secret: TokenSecret,
	/// When the token was obtained.
	pub issued_at: OffsetDateTime,
}
impl PendingRequestToken {
	fn is_expired(&self, ttl: Duration, now: OffsetDateTime) -> bool {
		now >= self.issued_at + ttl
	}
}
impl Debug for PendingRequestToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PendingRequestToken")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

/// Pending request tokens keyed by token value.
///
/// Each entry can be taken at most once. Entries older than the TTL behave as absent and are
/// dropped whenever a new token is inserted.
#[derive(Debug)]
pub struct PendingRequestTokens {
	ttl: Duration,
	entries: Mutex<HashMap<String, PendingRequestToken>>,
}
impl PendingRequestTokens {
	/// Creates an empty table whose entries expire after `ttl`.
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, entries: Mutex::new(HashMap::new()) }
	}

	/// Lifetime of a pending entry.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Stores `entry`, replacing any entry with the same token, and prunes expired entries.
	pub fn insert(&self, entry: PendingRequestToken, now: OffsetDateTime) {
		let ttl = self.ttl;
		let mut entries = self.entries.lock();

		entries.retain(|_, pending| !pending.is_expired(ttl, now));
		entries.insert(entry.token.clone(), entry);
	}

	/// Removes and returns the entry for `token`; `None` if absent, consumed, or expired.
	pub fn take(&self, token: &str, now: OffsetDateTime) -> Option<PendingRequestToken> {
		self.entries.lock().remove(token).filter(|pending| !pending.is_expired(self.ttl, now))
	}

	/// Returns `true` when `token` is present (expired or not).
	pub fn contains(&self, token: &str) -> bool {
		self.entries.lock().contains_key(token)
	}

	/// Number of entries, including expired ones not yet pruned.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	/// Returns `true` when the table holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}
}
impl Default for PendingRequestTokens {
	fn default() -> Self {
		Self::new(DEFAULT_PENDING_TTL)
	}
}
