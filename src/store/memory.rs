//! Thread-safe in-memory [`CredentialStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Member, MemberId},
	store::{CredentialStore, StoreFuture},
};

type MemberMap = Arc<RwLock<HashMap<MemberId, Member>>>;

/// Process-local member table; contents vanish with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(MemberMap);
impl MemoryStore {
	/// Number of stored members.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no member has been stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn save_member(&self, member: Member) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(member.id.clone(), member);

			Ok(())
		})
	}

	fn get_member<'a>(&'a self, id: &'a MemberId) -> StoreFuture<'a, Option<Member>> {
		let map = self.0.clone();
		let id = id.to_owned();

		Box::pin(async move { Ok(map.read().get(&id).cloned()) })
	}
}
