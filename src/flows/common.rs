//! Shared helpers for flow implementations (request parameters, singleflight guards).

// self
use crate::{
	_prelude::*,
	auth::{ReportId, WorkspaceId},
	flows::Broker,
	store::StoreKey,
};

/// Parameters addressing one embed-token request.
#[derive(Clone, Debug)]
pub struct EmbedRequest {
	/// Workspace holding the report.
	pub workspace: WorkspaceId,
	/// Report to embed.
	pub report: ReportId,
}
impl EmbedRequest {
	/// Creates a request from validated identifiers.
	pub fn new(workspace: WorkspaceId, report: ReportId) -> Self {
		Self { workspace, report }
	}

	/// Cache key for this request.
	pub fn store_key(&self) -> StoreKey {
		StoreKey::new(self.workspace.clone(), self.report.clone())
	}
}

/// Returns (and creates on demand) the singleflight guard for a store key.
pub(crate) fn flow_guard(broker: &Broker, key: &StoreKey) -> Arc<AsyncMutex<()>> {
	let mut guards = broker.flow_guards.lock();

	guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_yields_a_matching_store_key() {
		let request = EmbedRequest::new(
			WorkspaceId::new("ws-1").expect("Workspace fixture should be valid."),
			ReportId::new("rpt-1").expect("Report fixture should be valid."),
		);
		let key = request.store_key();

		assert_eq!(key.workspace.as_ref(), "ws-1");
		assert_eq!(key.report.as_ref(), "rpt-1");
	}
}
