//! Environment-sourced credentials and the vendor endpoint set consumed by every flow.

// std
use std::env;
// self
use crate::{
	_prelude::*,
	auth::{TenantId, TokenSecret},
	error::ConfigError,
};

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
const DEFAULT_API: &str = "https://api.powerbi.com/v1.0/myorg";
const DEFAULT_PORTAL: &str = "https://app.powerbi.com";
const DEFAULT_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";

/// Service-principal configuration handed to the broker at construction time.
///
/// Secrets are read once, from the environment or the caller, and never
/// consulted ad hoc during request handling.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
	/// Identity tenant the credential exchange runs against.
	pub tenant: TenantId,
	/// OAuth 2.0 client identifier of the service principal.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: TokenSecret,
}
impl BrokerConfig {
	/// Creates a configuration from explicit values.
	pub fn new(
		tenant: TenantId,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			tenant,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
		}
	}

	/// Reads `REPORTING_TENANT_ID`, `REPORTING_CLIENT_ID`, and `REPORTING_CLIENT_SECRET`.
	pub fn from_env() -> Result<Self, ConfigError> {
		let tenant = TenantId::new(require_env("REPORTING_TENANT_ID")?)?;
		let client_id = require_env("REPORTING_CLIENT_ID")?;
		let client_secret = require_env("REPORTING_CLIENT_SECRET")?;

		Ok(Self::new(tenant, client_id, client_secret))
	}
}

/// Vendor endpoint set with production defaults and per-endpoint overrides.
///
/// Overrides exist so deployments behind gateways and tests against mock
/// servers can redirect each upstream independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorEndpoints {
	/// Identity authority base, joined with the tenant to form the token endpoint.
	pub authority: Url,
	/// Vendor REST API root.
	pub api: Url,
	/// Portal base used to synthesize embed URLs on cache hits.
	pub portal: Url,
	/// Scope requested during the credential exchange.
	pub scope: String,
}
impl VendorEndpoints {
	/// Applies `REPORTING_AUTHORITY_URL`, `REPORTING_API_URL`, `REPORTING_PORTAL_URL`, and
	/// `REPORTING_SCOPE` overrides on top of the defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut endpoints = Self::default();

		if let Some(value) = optional_env("REPORTING_AUTHORITY_URL") {
			endpoints.authority = parse_endpoint(&value)?;
		}
		if let Some(value) = optional_env("REPORTING_API_URL") {
			endpoints.api = parse_endpoint(&value)?;
		}
		if let Some(value) = optional_env("REPORTING_PORTAL_URL") {
			endpoints.portal = parse_endpoint(&value)?;
		}
		if let Some(value) = optional_env("REPORTING_SCOPE") {
			endpoints.scope = value;
		}

		Ok(endpoints)
	}

	/// Overrides the identity authority base.
	pub fn with_authority(mut self, url: Url) -> Self {
		self.authority = url;

		self
	}

	/// Overrides the vendor API root.
	pub fn with_api(mut self, url: Url) -> Self {
		self.api = url;

		self
	}

	/// Overrides the portal base used for synthesized embed URLs.
	pub fn with_portal(mut self, url: Url) -> Self {
		self.portal = url;

		self
	}

	/// Overrides the credential exchange scope.
	pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Tenant-scoped client-credentials token endpoint.
	pub fn token_endpoint(&self, tenant: &TenantId) -> Result<Url, ConfigError> {
		parse_endpoint(&format!(
			"{}/{tenant}/oauth2/v2.0/token",
			self.authority.as_str().trim_end_matches('/'),
		))
	}

	/// Portal embed URL synthesized for cache hits, carrying the pair as query parameters.
	pub fn synthesized_embed_url(&self, workspace: &str, report: &str) -> Result<Url, ConfigError> {
		let mut url =
			parse_endpoint(&format!("{}/reportEmbed", self.portal.as_str().trim_end_matches('/')))?;

		url.query_pairs_mut().append_pair("reportId", report).append_pair("groupId", workspace);

		Ok(url)
	}

	pub(crate) fn generate_token_endpoint(
		&self,
		workspace: &str,
		report: &str,
	) -> Result<Url, ConfigError> {
		self.api_endpoint(&format!("groups/{workspace}/reports/{report}/GenerateToken"))
	}

	pub(crate) fn report_endpoint(&self, workspace: &str, report: &str) -> Result<Url, ConfigError> {
		self.api_endpoint(&format!("groups/{workspace}/reports/{report}"))
	}

	pub(crate) fn workspaces_endpoint(&self) -> Result<Url, ConfigError> {
		self.api_endpoint("groups")
	}

	pub(crate) fn reports_endpoint(&self, workspace: &str) -> Result<Url, ConfigError> {
		self.api_endpoint(&format!("groups/{workspace}/reports"))
	}

	pub(crate) fn dashboards_endpoint(&self, workspace: &str) -> Result<Url, ConfigError> {
		self.api_endpoint(&format!("groups/{workspace}/dashboards"))
	}

	fn api_endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		parse_endpoint(&format!("{}/{path}", self.api.as_str().trim_end_matches('/')))
	}
}
impl Default for VendorEndpoints {
	fn default() -> Self {
		Self {
			authority: Url::parse(DEFAULT_AUTHORITY).expect("Default authority URL must parse."),
			api: Url::parse(DEFAULT_API).expect("Default API URL must parse."),
			portal: Url::parse(DEFAULT_PORTAL).expect("Default portal URL must parse."),
			scope: DEFAULT_SCOPE.into(),
		}
	}
}

fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint { source })
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
	env::var(name).ok().filter(|value| !value.is_empty()).ok_or(ConfigError::MissingEnv { name })
}

fn optional_env(name: &str) -> Option<String> {
	env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_endpoint_is_tenant_scoped() {
		let tenant = TenantId::new("contoso").expect("Tenant fixture should be valid.");
		let endpoint = VendorEndpoints::default()
			.token_endpoint(&tenant)
			.expect("Token endpoint should derive from the default authority.");

		assert_eq!(
			endpoint.as_str(),
			"https://login.microsoftonline.com/contoso/oauth2/v2.0/token",
		);
	}

	#[test]
	fn vendor_endpoints_derive_per_pair_paths() {
		let endpoints = VendorEndpoints::default();
		let generate = endpoints
			.generate_token_endpoint("w1", "r1")
			.expect("Generate-token endpoint should derive.");
		let details =
			endpoints.report_endpoint("w1", "r1").expect("Report endpoint should derive.");

		assert_eq!(
			generate.as_str(),
			"https://api.powerbi.com/v1.0/myorg/groups/w1/reports/r1/GenerateToken",
		);
		assert_eq!(details.as_str(), "https://api.powerbi.com/v1.0/myorg/groups/w1/reports/r1");
		assert_eq!(
			endpoints.workspaces_endpoint().expect("Workspaces endpoint should derive.").as_str(),
			"https://api.powerbi.com/v1.0/myorg/groups",
		);
	}

	#[test]
	fn synthesized_embed_url_carries_the_pair() {
		let url = VendorEndpoints::default()
			.synthesized_embed_url("w1", "r1")
			.expect("Synthesized embed URL should derive.");

		assert_eq!(url.as_str(), "https://app.powerbi.com/reportEmbed?reportId=r1&groupId=w1");
	}

	#[test]
	fn overrides_replace_defaults() {
		let base = Url::parse("https://mock.test").expect("Override fixture should parse.");
		let endpoints = VendorEndpoints::default()
			.with_authority(base.clone())
			.with_api(base.clone())
			.with_portal(base)
			.with_scope("scope.test/.default");

		assert_eq!(endpoints.scope, "scope.test/.default");
		assert_eq!(
			endpoints
				.reports_endpoint("w2")
				.expect("Reports endpoint should derive from the override.")
				.as_str(),
			"https://mock.test/groups/w2/reports",
		);
	}

	#[test]
	fn broker_config_redacts_the_secret() {
		let tenant = TenantId::new("tenant-1").expect("Tenant fixture should be valid.");
		let config = BrokerConfig::new(tenant, "client-1", "very-secret");

		assert!(!format!("{config:?}").contains("very-secret"));
	}
}
