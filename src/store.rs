//! Storage abstraction for minted embed tokens.
//!
//! The broker caches one [`EmbedRecord`] per (workspace, report) pair and
//! treats the stored expiry as authoritative: a record at or past its expiry
//! instant is never served. Implementations must be safe to share across
//! concurrent flows.

// self
use crate::{
	_prelude::*,
	auth::{ReportId, TokenSecret, WorkspaceId},
};

pub mod memory;
pub use memory::MemoryStore;

/// Boxed future returned by [`EmbedTokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Error surface for storage backends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Stored payload could not be encoded or decoded.
	#[error("store serialization failure: {message}")]
	Serialization {
		/// Backend-provided detail.
		message: String,
	},
	/// Backend-specific failure (I/O, poisoned lock, connectivity).
	#[error("store backend failure: {message}")]
	Backend {
		/// Backend-provided detail.
		message: String,
	},
}

/// Cache key addressing one embed token: the (workspace, report) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreKey {
	/// Workspace component.
	pub workspace: WorkspaceId,
	/// Report component.
	pub report: ReportId,
}
impl StoreKey {
	/// Creates a key from validated components.
	pub fn new(workspace: WorkspaceId, report: ReportId) -> Self {
		Self { workspace, report }
	}
}
impl Display for StoreKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}{}", self.workspace, self.report)
	}
}

/// Cached embed token together with the metadata needed to serve a hit.
#[derive(Clone, Debug)]
pub struct EmbedRecord {
	/// Embed token material minted by the vendor.
	pub token: TokenSecret,
	/// Expiry instant declared by the vendor at mint time.
	pub expires_at: OffsetDateTime,
	/// Report display name captured when the token was minted.
	pub report_name: String,
}
impl EmbedRecord {
	/// Returns `true` if the record must not be served at the provided instant.
	///
	/// Expiry is inclusive: a record whose expiry equals the instant is stale.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at <= instant
	}
}

/// Async storage contract for embed-token records.
///
/// Futures are boxed so the trait stays object-safe; the broker holds stores
/// behind `Arc<dyn EmbedTokenStore>`.
pub trait EmbedTokenStore: Send + Sync {
	/// Fetches the record for a key, if present.
	///
	/// Backends return whatever they hold; expiry filtering is the caller's
	/// responsibility so that a single `now` governs the whole flow.
	fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFuture<'a, Option<EmbedRecord>>;

	/// Inserts or replaces the record for a key.
	fn put(&self, key: StoreKey, record: EmbedRecord) -> StoreFuture<'_, ()>;

	/// Removes every record expired at `now` and reports how many were dropped.
	fn sweep(&self, now: OffsetDateTime) -> StoreFuture<'_, usize>;
}
