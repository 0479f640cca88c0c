//! In-memory storage backend.

// self
use crate::{
	_prelude::*,
	store::{EmbedRecord, EmbedTokenStore, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, EmbedRecord>>>;

/// Process-local store backed by a [`HashMap`].
///
/// Records vanish on restart; the broker simply re-mints on the next request.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of records currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` if no records are held.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: &StoreMap, key: &StoreKey) -> Option<EmbedRecord> {
		map.read().get(key).cloned()
	}

	fn put_now(map: &StoreMap, key: StoreKey, record: EmbedRecord) {
		map.write().insert(key, record);
	}

	fn sweep_now(map: &StoreMap, now: OffsetDateTime) -> usize {
		let mut guard = map.write();
		let before = guard.len();

		guard.retain(|_, record| !record.is_expired_at(now));

		before - guard.len()
	}
}
impl EmbedTokenStore for MemoryStore {
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<EmbedRecord>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(&map, key)) })
	}

	fn put(&self, key: StoreKey, record: EmbedRecord) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::put_now(&map, key, record);

			Ok(())
		})
	}

	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::sweep_now(&map, now)) })
	}
}
