//! High-level flow orchestrators powered by the broker facade.

pub mod common;
pub mod embed;
pub mod listing;

pub use common::*;
pub use embed::*;
pub use listing::*;

// self
use crate::{
	_prelude::*,
	config::{BrokerConfig, VendorEndpoints},
	http::ReqwestHttpClient,
	identity::CredentialExchange,
	store::{EmbedTokenStore, StoreKey},
	vendor::VendorApi,
};

/// Coordinates embed-token brokering and catalog listings against one tenant.
///
/// The broker owns the token store, the identity exchange, and the vendor API
/// client so individual flow implementations can focus on flow-specific logic
/// (cache evaluation, token minting, per-workspace fan-out). Everything is
/// cheaply cloneable; clones share the store and the singleflight guards.
#[derive(Clone)]
pub struct Broker {
	/// Store that caches minted embed tokens.
	pub store: Arc<dyn EmbedTokenStore>,
	/// Client-credentials exchange against the identity provider.
	pub exchange: CredentialExchange,
	/// Bearer-authorized vendor REST client.
	pub api: VendorApi,
	/// Endpoint set shared with the exchange and the vendor client.
	pub endpoints: VendorEndpoints,
	flow_guards: Arc<Mutex<HashMap<StoreKey, Arc<AsyncMutex<()>>>>>,
}
impl Broker {
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn EmbedTokenStore>,
		config: &BrokerConfig,
		endpoints: VendorEndpoints,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let exchange = CredentialExchange::new(config, &endpoints, http_client.clone())?;
		let api = VendorApi::new(endpoints.clone(), http_client);

		Ok(Self { store, exchange, api, endpoints, flow_guards: Default::default() })
	}

	/// Creates a broker with its own reqwest-backed transport.
	pub fn new(
		store: Arc<dyn EmbedTokenStore>,
		config: &BrokerConfig,
		endpoints: VendorEndpoints,
	) -> Result<Self> {
		Self::with_http_client(store, config, endpoints, ReqwestHttpClient::default())
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker").field("endpoints", &self.endpoints).finish()
	}
}
