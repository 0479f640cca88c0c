//! Client-credentials exchange against the identity provider's token endpoint.
//!
//! The exchange posts a form-encoded `client_credentials` grant (client id and
//! secret in the body, scope fixed to the vendor API default) and returns a
//! short-lived [`ServiceCredential`]. Failures propagate without retry; the
//! broker re-invokes on the next cache-missing request.

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{ServiceCredential, TokenSecret},
	config::{BrokerConfig, VendorEndpoints},
	error::{ConfigError, CredentialError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

type TokenOnlyClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Exchanges configured client credentials for vendor-scoped service credentials.
#[derive(Clone)]
pub struct CredentialExchange {
	oauth_client: TokenOnlyClient,
	http_client: ReqwestHttpClient,
	scope: String,
}
impl CredentialExchange {
	/// Builds the exchange from the broker configuration and endpoint set.
	pub fn new(
		config: &BrokerConfig,
		endpoints: &VendorEndpoints,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let token_url = TokenUrl::new(endpoints.token_endpoint(&config.tenant)?.to_string())
			.map_err(|source| ConfigError::InvalidTokenEndpoint { source })?;
		// The provider expects client_id/client_secret in the form body, not Basic auth.
		let oauth_client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.expose().to_owned()))
			.set_auth_type(AuthType::RequestBody)
			.set_token_uri(token_url);

		Ok(Self { oauth_client, http_client, scope: endpoints.scope.clone() })
	}

	/// Performs the grant and returns a fresh credential.
	pub async fn acquire(&self) -> Result<ServiceCredential> {
		const KIND: FlowKind = FlowKind::CredentialExchange;

		let span = FlowSpan::new(KIND, "acquire");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.acquire_credential()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn acquire_credential(&self) -> Result<ServiceCredential> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_client_credentials()
			.add_scope(Scope::new(self.scope.clone()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_token_error(meta.take(), err))?;
		let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
		let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		if expires_in <= 0 {
			return Err(ConfigError::NonPositiveExpiresIn.into());
		}

		let issued_at = OffsetDateTime::now_utc();

		Ok(ServiceCredential {
			access_token: TokenSecret::new(response.access_token().secret().to_owned()),
			issued_at,
			expires_at: issued_at + Duration::seconds(expires_in),
		})
	}
}
impl Debug for CredentialExchange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialExchange").field("scope", &self.scope).finish()
	}
}

fn map_token_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let status = meta.as_ref().and_then(|value| value.status);
	let retry_after = meta.as_ref().and_then(|value| value.retry_after);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let message = match response.error_description() {
				Some(description) => description.clone(),
				None => response.error().as_ref().to_owned(),
			};

			CredentialError::Rejected { message, status, retry_after }.into()
		},
		RequestTokenError::Request(error) => map_transport_error(status, retry_after, error),
		RequestTokenError::Parse(source, _body) =>
			CredentialError::ResponseParse { source, status }.into(),
		RequestTokenError::Other(message) =>
			CredentialError::Rejected { message, status, retry_after }.into(),
	}
}

fn map_transport_error(
	status: Option<u16>,
	retry_after: Option<Duration>,
	err: HttpClientError<ReqwestError>,
) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => {
			let inner = *inner;

			if inner.is_builder() {
				return ConfigError::from(inner).into();
			}
			if inner.is_timeout() {
				return CredentialError::Rejected {
					message: "request timed out while calling the token endpoint".into(),
					status: status.or_else(|| inner.status().map(|code| code.as_u16())),
					retry_after,
				}
				.into();
			}

			TransportError::from(inner).into()
		},
		HttpClientError::Http(inner) => ConfigError::HttpRequest(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			CredentialError::Rejected { message, status, retry_after }.into(),
		_ => CredentialError::Rejected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
			retry_after,
		}
		.into(),
	}
}
