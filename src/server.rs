//! Inbound HTTP surface for the broker.
//!
//! Routes:
//!
//! - `POST /api/embed-token` brokers an embed token for a (workspace, report) pair.
//! - `GET /api/catalog` lists every visible workspace with reports and dashboards.
//! - `GET /healthz` liveness probe.
//!
//! Request problems (missing or malformed identifiers) map to `400` with an
//! `error` body; broker failures map to `500` with a stable `error` message plus
//! a `details` field carrying the classified failure.

// crates.io
use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
// self
use crate::{
	_prelude::*,
	auth::{IdentifierError, ReportId, WorkspaceId},
	error::VendorError,
	flows::{Broker, EmbedGrant, EmbedRequest, WorkspaceCatalog},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ServerState {
	/// Broker serving both routes.
	pub broker: Arc<Broker>,
}
impl ServerState {
	/// Wraps a broker for router construction.
	pub fn new(broker: Arc<Broker>) -> Self {
		Self { broker }
	}
}
impl Debug for ServerState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ServerState").field("broker", &self.broker).finish()
	}
}

/// Builds the broker router over the provided state.
pub fn router(state: ServerState) -> Router {
	Router::new()
		.route("/api/embed-token", post(embed_token))
		.route("/api/catalog", get(catalog))
		.route("/healthz", get(health))
		.with_state(state)
}

/// Serves the router on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
	axum::serve(listener, router(state)).await
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbedTokenBody {
	#[serde(default)]
	workspace_id: Option<String>,
	#[serde(default)]
	report_id: Option<String>,
}

/// Failures surfaced by the HTTP layer.
#[derive(Debug, ThisError)]
enum ApiError {
	/// A required request field was absent or empty.
	#[error("{name} is required.")]
	MissingField {
		/// Wire name of the missing field.
		name: &'static str,
	},
	/// A supplied identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// The broker flow failed after validation passed.
	#[error(transparent)]
	Broker(#[from] Error),
}
impl ApiError {
	fn static_message(&self) -> &'static str {
		match self {
			Self::Broker(Error::Credential(_)) => "Failed to acquire service credential.",
			Self::Broker(Error::Vendor(VendorError::ReportDetails { .. })) =>
				"Failed to get report details.",
			Self::Broker(Error::Vendor(
				VendorError::ListWorkspaces { .. }
				| VendorError::ListReports { .. }
				| VendorError::ListDashboards { .. },
			)) => "Failed to list workspaces.",
			_ => "Failed to generate embed token.",
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		match self {
			Self::MissingField { .. } | Self::InvalidIdentifier(_) =>
				(StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() }))).into_response(),
			Self::Broker(_) => {
				tracing::error!(error = %self, "broker flow failed");

				(
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(json!({
						"error": self.static_message(),
						"details": self.to_string(),
					})),
				)
					.into_response()
			},
		}
	}
}

fn required_field(value: Option<String>, name: &'static str) -> Result<String, ApiError> {
	value.filter(|value| !value.is_empty()).ok_or(ApiError::MissingField { name })
}

async fn embed_token(
	State(state): State<ServerState>,
	Json(body): Json<EmbedTokenBody>,
) -> Result<Json<EmbedGrant>, ApiError> {
	let workspace = WorkspaceId::new(required_field(body.workspace_id, "workspaceId")?)?;
	let report = ReportId::new(required_field(body.report_id, "reportId")?)?;
	let grant = state.broker.embed_report(EmbedRequest::new(workspace, report)).await?;

	Ok(Json(grant))
}

async fn catalog(State(state): State<ServerState>) -> Result<Json<WorkspaceCatalog>, ApiError> {
	let catalog = state.broker.catalog().await?;

	Ok(Json(catalog))
}

async fn health() -> StatusCode {
	StatusCode::OK
}
