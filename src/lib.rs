//! Rust's turnkey report-embed broker: exchange service credentials, mint viewer-scoped embed
//! tokens, and serve expiry-aware caching in one crate built for BI portals.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod identity;
pub mod obs;
#[cfg(feature = "server")] pub mod server;
pub mod store;
pub mod vendor;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::TenantId,
		config::{BrokerConfig, VendorEndpoints},
		flows::Broker,
		http::ReqwestHttpClient,
		store::{EmbedTokenStore, MemoryStore},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`Broker`] backed by an in-memory store and the insecure reqwest transport
	/// used across integration tests.
	pub fn build_test_broker(
		endpoints: VendorEndpoints,
		tenant: &str,
		client_id: &str,
		client_secret: &str,
	) -> (Broker, Arc<MemoryStore>) {
		let tenant = TenantId::new(tenant).expect("Failed to build tenant identifier for tests.");
		let config = BrokerConfig::new(tenant, client_id, client_secret);
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn EmbedTokenStore> = store_backend.clone();
		let broker = Broker::with_http_client(store, &config, endpoints, test_reqwest_http_client())
			.expect("Failed to construct test broker.");

		(broker, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(feature = "server")] use tracing_subscriber as _;
#[cfg(test)] use {httpmock as _, tokio as _};
