//! Broker-level error types shared across flows, the vendor client, and stores.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Cache-layer failure.
	#[error("{0}")]
	Store(#[from] crate::store::StoreError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Identity provider failed to issue a service credential.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Vendor API call failed.
	#[error(transparent)]
	Vendor(#[from] VendorError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable was absent or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Configured identifier failed validation.
	#[error("Configured identifier is invalid.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Derived endpoint URL could not be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint URL was rejected by the OAuth client.
	#[error("Token endpoint URL is invalid.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Token endpoint response omitted `expires_in`.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures acquiring the service credential from the identity provider.
///
/// Every variant is terminal for the request; the broker never retries and the
/// caller re-invokes on demand.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// Identity provider rejected the exchange or returned an unexpected response.
	#[error("Failed to acquire service credential: {message}.")]
	Rejected {
		/// Provider- or broker-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Identity provider returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Vendor REST failures, keyed by the operation that observed them.
#[derive(Debug, ThisError)]
pub enum VendorError {
	/// Token-generation endpoint returned a non-success status.
	#[error("Failed to generate embed token: vendor returned HTTP {status}.")]
	GenerateToken {
		/// Upstream HTTP status code.
		status: u16,
	},
	/// Report-details endpoint returned a non-success status.
	#[error("Failed to get report details: vendor returned HTTP {status}.")]
	ReportDetails {
		/// Upstream HTTP status code.
		status: u16,
	},
	/// Workspace listing returned a non-success status.
	#[error("Failed to list workspaces: vendor returned HTTP {status}.")]
	ListWorkspaces {
		/// Upstream HTTP status code.
		status: u16,
	},
	/// Per-workspace report listing returned a non-success status.
	#[error("Failed to fetch reports for workspace `{workspace}`: vendor returned HTTP {status}.")]
	ListReports {
		/// Workspace whose listing failed.
		workspace: String,
		/// Upstream HTTP status code.
		status: u16,
	},
	/// Per-workspace dashboard listing returned a non-success status.
	#[error("Failed to fetch dashboards for workspace `{workspace}`: vendor returned HTTP {status}.")]
	ListDashboards {
		/// Workspace whose listing failed.
		workspace: String,
		/// Upstream HTTP status code.
		status: u16,
	},
	/// Vendor responded with JSON the broker could not decode.
	#[error("Vendor returned malformed JSON for {operation}.")]
	Decode {
		/// Operation label for the failed call.
		operation: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the upstream endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
