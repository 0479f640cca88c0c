//! Workspace catalog listing with per-workspace failure tolerance.
//!
//! [`Broker::catalog`] acquires one service credential, lists every visible
//! workspace, then fans out report and dashboard listings concurrently. A
//! workspace whose report listing fails still appears in the catalog with its
//! `error` field populated; only the top-level workspace listing is fatal.
//! Dashboard failures degrade to an empty list since dashboards are
//! supplementary.

// crates.io
use futures_util::future;
// self
use crate::{
	_prelude::*,
	auth::ServiceCredential,
	flows::Broker,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	vendor::{Dashboard, Report, Workspace},
};

/// Aggregate counts across the whole catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
	/// Number of workspaces visible to the credential.
	pub total_workspaces: usize,
	/// Reports summed across all workspaces.
	pub total_reports: usize,
	/// Dashboards summed across all workspaces.
	pub total_dashboards: usize,
	/// Workspaces running on dedicated capacity.
	pub workspaces_with_capacity: usize,
}

/// One workspace with its listed contents.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEntry {
	/// Workspace metadata as returned by the vendor.
	#[serde(flatten)]
	pub workspace: Workspace,
	/// Reports in the workspace; empty when the listing failed.
	pub reports: Vec<Report>,
	/// Dashboards in the workspace; empty when the listing failed.
	pub dashboards: Vec<Dashboard>,
	/// Failure detail when the report listing for this workspace failed.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Unprocessed workspace payload kept alongside the enriched entries.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCatalog {
	/// Workspaces exactly as the vendor returned them.
	pub workspaces: Vec<Workspace>,
}

/// Full catalog response: summary, enriched entries, and the raw listing.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceCatalog {
	/// Aggregate counts.
	pub summary: CatalogSummary,
	/// Workspaces with their reports and dashboards.
	pub workspaces: Vec<WorkspaceEntry>,
	/// Unprocessed workspace listing.
	pub raw: RawCatalog,
}

impl Broker {
	/// Lists every visible workspace together with its reports and dashboards.
	pub async fn catalog(&self) -> Result<WorkspaceCatalog> {
		const KIND: FlowKind = FlowKind::Listing;

		let span = FlowSpan::new(KIND, "catalog");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let credential = self.exchange.acquire().await?;
				let workspaces = self.api.workspaces(&credential).await?;
				let entries = future::join_all(
					workspaces.iter().map(|workspace| self.workspace_entry(&credential, workspace)),
				)
				.await;
				let summary = CatalogSummary {
					total_workspaces: workspaces.len(),
					total_reports: entries.iter().map(|entry| entry.reports.len()).sum(),
					total_dashboards: entries.iter().map(|entry| entry.dashboards.len()).sum(),
					workspaces_with_capacity: workspaces
						.iter()
						.filter(|workspace| workspace.is_on_dedicated_capacity)
						.count(),
				};

				Ok(WorkspaceCatalog {
					summary,
					workspaces: entries,
					raw: RawCatalog { workspaces },
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn workspace_entry(
		&self,
		credential: &ServiceCredential,
		workspace: &Workspace,
	) -> WorkspaceEntry {
		let (reports, dashboards) = futures_util::join!(
			self.api.reports(credential, &workspace.id),
			self.api.dashboards(credential, &workspace.id),
		);
		let (reports, error) = match reports {
			Ok(reports) => (reports, None),
			Err(err) => (Vec::new(), Some(err.to_string())),
		};

		WorkspaceEntry {
			workspace: workspace.clone(),
			reports,
			dashboards: dashboards.unwrap_or_default(),
			error,
		}
	}
}
