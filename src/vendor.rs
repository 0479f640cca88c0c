//! Vendor REST client for embed tokens, report metadata, and catalog listings.
//!
//! Every call is bearer-authorized with a [`ServiceCredential`] and terminal on
//! failure: non-success statuses map to operation-tagged [`VendorError`]s and
//! malformed payloads surface the JSON path that failed to decode.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ReportId, ServiceCredential, TokenSecret, WorkspaceId},
	config::VendorEndpoints,
	error::{TransportError, VendorError},
	http::ReqwestHttpClient,
};

/// Body sent to the vendor's token-generation endpoint: view-only, no save-as.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTokenBody {
	access_level: &'static str,
	allow_save_as: bool,
}

/// Embed token minted by the vendor for one (workspace, report) pair.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTokenResponse {
	/// Viewer-scoped embed token material.
	pub token: TokenSecret,
	/// Expiry instant declared by the vendor.
	#[serde(with = "time::serde::rfc3339")]
	pub expiration: OffsetDateTime,
}

/// Report metadata shared by the details endpoint and per-workspace listings.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
	/// Vendor-assigned report identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Canonical embed URL.
	pub embed_url: Url,
	/// Backing dataset identifier, when exposed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dataset_id: Option<String>,
	/// Browser-facing report URL, when exposed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub web_url: Option<Url>,
}

/// Workspace entry from the vendor's groups listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
	/// Workspace identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Workspace type label.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Lifecycle state.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
	/// Whether the workspace runs on dedicated (premium) capacity.
	#[serde(default)]
	pub is_on_dedicated_capacity: bool,
}

/// Dashboard entry from the vendor's dashboards listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
	/// Dashboard identifier.
	pub id: String,
	/// Display name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub display_name: Option<String>,
	/// Canonical embed URL, when exposed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embed_url: Option<Url>,
}

// Collection endpoints wrap their payloads in `{"value": [...]}`.
#[derive(Debug, Deserialize)]
struct ValueEnvelope<T> {
	#[serde(default = "Vec::new")]
	value: Vec<T>,
}

/// Bearer-authorized client for the vendor REST surface.
#[derive(Clone, Debug)]
pub struct VendorApi {
	endpoints: VendorEndpoints,
	http_client: ReqwestHttpClient,
}
impl VendorApi {
	/// Creates a client over the provided endpoint set and transport.
	pub fn new(endpoints: VendorEndpoints, http_client: ReqwestHttpClient) -> Self {
		Self { endpoints, http_client }
	}

	/// Mints a view-only embed token for the pair.
	pub async fn generate_embed_token(
		&self,
		credential: &ServiceCredential,
		workspace: &WorkspaceId,
		report: &ReportId,
	) -> Result<EmbedTokenResponse> {
		let url = self.endpoints.generate_token_endpoint(workspace, report)?;
		let response = self
			.http_client
			.post(url)
			.bearer_auth(credential.bearer())
			.json(&GenerateTokenBody { access_level: "View", allow_save_as: false })
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(VendorError::GenerateToken { status: status.as_u16() }.into());
		}

		decode("generate_embed_token", &response.bytes().await.map_err(TransportError::from)?)
	}

	/// Fetches the canonical embed URL and display name for the pair.
	pub async fn report_details(
		&self,
		credential: &ServiceCredential,
		workspace: &WorkspaceId,
		report: &ReportId,
	) -> Result<Report> {
		let url = self.endpoints.report_endpoint(workspace, report)?;
		let response = self
			.http_client
			.get(url)
			.bearer_auth(credential.bearer())
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(VendorError::ReportDetails { status: status.as_u16() }.into());
		}

		decode("report_details", &response.bytes().await.map_err(TransportError::from)?)
	}

	/// Lists every workspace visible to the credential.
	pub async fn workspaces(&self, credential: &ServiceCredential) -> Result<Vec<Workspace>> {
		let url = self.endpoints.workspaces_endpoint()?;
		let response = self
			.http_client
			.get(url)
			.bearer_auth(credential.bearer())
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(VendorError::ListWorkspaces { status: status.as_u16() }.into());
		}

		let envelope: ValueEnvelope<Workspace> =
			decode("list_workspaces", &response.bytes().await.map_err(TransportError::from)?)?;

		Ok(envelope.value)
	}

	/// Lists the reports in one workspace.
	pub async fn reports(
		&self,
		credential: &ServiceCredential,
		workspace: &str,
	) -> Result<Vec<Report>> {
		let url = self.endpoints.reports_endpoint(workspace)?;
		let response = self
			.http_client
			.get(url)
			.bearer_auth(credential.bearer())
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(VendorError::ListReports {
				workspace: workspace.to_owned(),
				status: status.as_u16(),
			}
			.into());
		}

		let envelope: ValueEnvelope<Report> =
			decode("list_reports", &response.bytes().await.map_err(TransportError::from)?)?;

		Ok(envelope.value)
	}

	/// Lists the dashboards in one workspace.
	pub async fn dashboards(
		&self,
		credential: &ServiceCredential,
		workspace: &str,
	) -> Result<Vec<Dashboard>> {
		let url = self.endpoints.dashboards_endpoint(workspace)?;
		let response = self
			.http_client
			.get(url)
			.bearer_auth(credential.bearer())
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();

		if !status.is_success() {
			return Err(VendorError::ListDashboards {
				workspace: workspace.to_owned(),
				status: status.as_u16(),
			}
			.into());
		}

		let envelope: ValueEnvelope<Dashboard> =
			decode("list_dashboards", &response.bytes().await.map_err(TransportError::from)?)?;

		Ok(envelope.value)
	}
}

fn decode<T>(operation: &'static str, bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| VendorError::Decode { operation, source }.into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn generate_token_body_matches_the_wire_contract() {
		let body = GenerateTokenBody { access_level: "View", allow_save_as: false };
		let payload = serde_json::to_string(&body).expect("Body should serialize to JSON.");

		assert_eq!(payload, "{\"accessLevel\":\"View\",\"allowSaveAs\":false}");
	}

	#[test]
	fn embed_token_response_parses_rfc3339_expirations() {
		let parsed: EmbedTokenResponse = decode(
			"generate_embed_token",
			b"{\"token\":\"T1\",\"expiration\":\"2025-06-01T12:00:00Z\"}",
		)
		.expect("Embed token payload should decode.");

		assert_eq!(parsed.token.expose(), "T1");
		assert_eq!(parsed.expiration, macros::datetime!(2025-06-01 12:00 UTC));
	}

	#[test]
	fn value_envelope_defaults_to_empty() {
		let parsed: ValueEnvelope<Workspace> =
			decode("list_workspaces", b"{}").expect("Empty envelope should decode.");

		assert!(parsed.value.is_empty());
	}

	#[test]
	fn workspace_parses_vendor_field_names() {
		let parsed: ValueEnvelope<Workspace> = decode(
			"list_workspaces",
			b"{\"value\":[{\"id\":\"w1\",\"name\":\"Sales\",\"type\":\"Workspace\",\
			\"state\":\"Active\",\"isOnDedicatedCapacity\":true}]}",
		)
		.expect("Workspace payload should decode.");
		let workspace = &parsed.value[0];

		assert_eq!(workspace.kind.as_deref(), Some("Workspace"));
		assert!(workspace.is_on_dedicated_capacity);
	}

	#[test]
	fn vendor_api_is_debuggable() {
		let api = VendorApi::new(VendorEndpoints::default(), ReqwestHttpClient::default());

		assert!(format!("{api:?}").contains("endpoints"));
	}

	#[test]
	fn decode_errors_carry_the_failing_path() {
		let err = decode::<EmbedTokenResponse>(
			"generate_embed_token",
			b"{\"token\":\"T1\",\"expiration\":42}",
		)
		.expect_err("Numeric expiration should fail to decode.");

		assert!(matches!(
			err,
			Error::Vendor(VendorError::Decode { operation: "generate_embed_token", .. }),
		));
	}
}
