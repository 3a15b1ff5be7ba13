//! File-backed [`CredentialStore`] that rewrites a JSON snapshot after each save.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Member, MemberId},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// On-disk layout: one record per member under the `members` namespace.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
	#[serde(default)]
	members: BTreeMap<MemberId, Member>,
}

/// Persists member credentials to a JSON file.
///
/// Saves hold the write lock while the snapshot is flushed to a temporary file and renamed
/// over the original, so concurrent saves are serialized and a crash never leaves a
/// half-written snapshot behind.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<BTreeMap<MemberId, Member>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		ensure_parent_exists(&path)?;

		let members = load_snapshot(&path)?.members;

		Ok(Self { path, inner: Arc::new(RwLock::new(members)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist_locked(&self, members: &BTreeMap<MemberId, Member>) -> Result<(), StoreError> {
		#[derive(Serialize)]
		struct SnapshotRef<'a> {
			members: &'a BTreeMap<MemberId, Member>,
		}

		ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(&SnapshotRef { members }).map_err(|e| {
			StoreError::Serialization { message: format!("Failed to serialize member snapshot: {e}") }
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn save_member(&self, member: Member) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let previous = guard.insert(member.id.clone(), member.clone());

			if let Err(e) = self.persist_locked(&guard) {
				// Keep memory consistent with what is on disk.
				match previous {
					Some(prev) => guard.insert(member.id, prev),
					None => guard.remove(&member.id),
				};

				return Err(e);
			}

			Ok(())
		})
	}

	fn get_member<'a>(&'a self, id: &'a MemberId) -> StoreFuture<'a, Option<Member>> {
		Box::pin(async move { Ok(self.inner.read().get(id).cloned()) })
	}
}

fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
	if !path.exists() {
		return Ok(Snapshot::default());
	}

	let bytes = fs::read(path).map_err(|e| StoreError::Backend {
		message: format!("Failed to read {}: {e}", path.display()),
	})?;

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Snapshot::default());
	}

	serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
		message: format!("Failed to parse {}: {e}", path.display()),
	})
}

fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
			message: format!("Failed to create store directory {}: {e}", parent.display()),
		})?;
	}

	Ok(())
}
