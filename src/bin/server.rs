//! Standalone embed-token broker server.
//!
//! Configuration is environment-driven:
//!
//! | Variable                  | Required | Default                                          |
//! |---------------------------|----------|--------------------------------------------------|
//! | `REPORTING_TENANT_ID`     | yes      |                                                  |
//! | `REPORTING_CLIENT_ID`     | yes      |                                                  |
//! | `REPORTING_CLIENT_SECRET` | yes      |                                                  |
//! | `REPORTING_AUTHORITY_URL` | no       | `https://login.microsoftonline.com`              |
//! | `REPORTING_API_URL`       | no       | `https://api.powerbi.com/v1.0/myorg`             |
//! | `REPORTING_PORTAL_URL`    | no       | `https://app.powerbi.com`                        |
//! | `REPORTING_SCOPE`         | no       | `https://analysis.windows.net/powerbi/api/.default` |
//! | `PORT`                    | no       | `8080`                                           |

// std
use std::{env, sync::Arc};
// crates.io
use embed_broker::{
	config::{BrokerConfig, VendorEndpoints},
	flows::Broker,
	server::{self, ServerState},
	store::MemoryStore,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = BrokerConfig::from_env().expect("Broker configuration must be present.");
	let endpoints = VendorEndpoints::from_env().expect("Endpoint overrides must be valid URLs.");
	let port = env::var("PORT").ok().and_then(|value| value.parse::<u16>().ok()).unwrap_or(8080);
	let store = Arc::new(MemoryStore::new());
	let broker =
		Broker::new(store, &config, endpoints).expect("Broker must build from configuration.");
	let state = ServerState::new(Arc::new(broker));
	let listener = TcpListener::bind(("0.0.0.0", port)).await.expect("Port must be bindable.");

	tracing::info!(port, "embed broker listening");

	server::serve(listener, state).await.expect("Server must not fail to serve.");
}
