// crates.io
use httpmock::prelude::*;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use tokio::net::TcpListener;
// self
use embed_broker::{
	_preludet::*,
	config::VendorEndpoints,
	server::{self, ServerState},
};

const TENANT: &str = "tenant-server";
const CLIENT_ID: &str = "client-server";
const CLIENT_SECRET: &str = "secret-server";

fn test_endpoints(server: &MockServer) -> VendorEndpoints {
	let base = Url::parse(&server.base_url()).expect("Mock server base URL should parse.");

	VendorEndpoints::default()
		.with_authority(base.clone())
		.with_api(base.clone())
		.with_portal(base)
		.with_scope("https://vendor.test/.default")
}

async fn spawn_server(upstream: &MockServer) -> String {
	let (broker, _store) =
		build_test_broker(test_endpoints(upstream), TENANT, CLIENT_ID, CLIENT_SECRET);
	let state = ServerState::new(Arc::new(broker));
	let listener = TcpListener::bind("127.0.0.1:0")
		.await
		.expect("Ephemeral listener should bind for server tests.");
	let addr = listener.local_addr().expect("Bound listener should expose its address.");

	tokio::spawn(async move { server::serve(listener, state).await });

	format!("http://{addr}")
}

async fn mock_identity(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(format!("/{TENANT}/oauth2/v2.0/token"));
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"svc-token\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await
}

#[tokio::test]
async fn embed_token_route_returns_the_grant() {
	let upstream = MockServer::start_async().await;
	let _identity = mock_identity(&upstream).await;
	let expiration = (OffsetDateTime::now_utc() + Duration::hours(1))
		.format(&Rfc3339)
		.expect("Instant should format as RFC 3339.");
	let _generate = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/groups/w1/reports/r1/GenerateToken");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"token\":\"minted-token\",\"expiration\":\"{expiration}\"}}"));
		})
		.await;
	let _details = upstream
		.mock_async(|when, then| {
			when.method(GET).path("/groups/w1/reports/r1");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":\"r1\",\"name\":\"Quarterly Revenue\",\
				\"embedUrl\":\"https://vendor.test/reportEmbed?reportId=r1\"}",
			);
		})
		.await;
	let base = spawn_server(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("{base}/api/embed-token"))
		.json(&serde_json::json!({ "workspaceId": "w1", "reportId": "r1" }))
		.send()
		.await
		.expect("Embed-token request should reach the server.");

	assert_eq!(response.status().as_u16(), 200);

	let body: Value =
		response.json().await.expect("Embed-token response body should be valid JSON.");

	assert_eq!(body["embedToken"], "minted-token");
	assert_eq!(body["embedUrl"], "https://vendor.test/reportEmbed?reportId=r1");
	assert_eq!(body["reportName"], "Quarterly Revenue");
	assert!(body["tokenExpiry"].is_string());
}

#[tokio::test]
async fn embed_token_route_rejects_missing_identifiers() {
	let upstream = MockServer::start_async().await;
	let identity = mock_identity(&upstream).await;
	let base = spawn_server(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("{base}/api/embed-token"))
		.json(&serde_json::json!({ "reportId": "r1" }))
		.send()
		.await
		.expect("Request missing workspaceId should reach the server.");

	assert_eq!(response.status().as_u16(), 400);

	let body: Value = response.json().await.expect("Error body should be valid JSON.");

	assert_eq!(body["error"], "workspaceId is required.");

	// Validation failures never touch the upstreams.
	identity.assert_calls_async(0).await;
}

#[tokio::test]
async fn embed_token_route_maps_upstream_failures_to_internal_errors() {
	let upstream = MockServer::start_async().await;
	let _identity = mock_identity(&upstream).await;
	let _generate = upstream
		.mock_async(|when, then| {
			when.method(POST).path("/groups/w1/reports/r1/GenerateToken");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"error\":{\"code\":\"InternalError\"}}");
		})
		.await;
	let base = spawn_server(&upstream).await;
	let response = reqwest::Client::new()
		.post(format!("{base}/api/embed-token"))
		.json(&serde_json::json!({ "workspaceId": "w1", "reportId": "r1" }))
		.send()
		.await
		.expect("Request hitting a failing upstream should reach the server.");

	assert_eq!(response.status().as_u16(), 500);

	let body: Value = response.json().await.expect("Error body should be valid JSON.");

	assert_eq!(body["error"], "Failed to generate embed token.");
	assert!(
		body["details"]
			.as_str()
			.expect("Error body should carry details.")
			.contains("500"),
	);
}

#[tokio::test]
async fn catalog_route_lists_workspaces() {
	let upstream = MockServer::start_async().await;
	let _identity = mock_identity(&upstream).await;
	let _workspaces = upstream
		.mock_async(|when, then| {
			when.method(GET).path("/groups");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"value\":[{\"id\":\"w1\",\"name\":\"Sales\"}]}");
		})
		.await;
	let _reports = upstream
		.mock_async(|when, then| {
			when.method(GET).path("/groups/w1/reports");
			then.status(200).header("content-type", "application/json").body(
				"{\"value\":[{\"id\":\"r1\",\"name\":\"Pipeline\",\
				\"embedUrl\":\"https://vendor.test/reportEmbed?reportId=r1\"}]}",
			);
		})
		.await;
	let _dashboards = upstream
		.mock_async(|when, then| {
			when.method(GET).path("/groups/w1/dashboards");
			then.status(200).header("content-type", "application/json").body("{\"value\":[]}");
		})
		.await;
	let base = spawn_server(&upstream).await;
	let response = reqwest::Client::new()
		.get(format!("{base}/api/catalog"))
		.send()
		.await
		.expect("Catalog request should reach the server.");

	assert_eq!(response.status().as_u16(), 200);

	let body: Value = response.json().await.expect("Catalog body should be valid JSON.");

	assert_eq!(body["summary"]["totalWorkspaces"], 1);
	assert_eq!(body["summary"]["totalReports"], 1);
	assert_eq!(body["workspaces"][0]["id"], "w1");
	assert_eq!(body["workspaces"][0]["reports"][0]["name"], "Pipeline");
	assert_eq!(body["raw"]["workspaces"][0]["name"], "Sales");
}

#[tokio::test]
async fn healthz_route_responds_ok() {
	let upstream = MockServer::start_async().await;
	let base = spawn_server(&upstream).await;
	let response = reqwest::Client::new()
		.get(format!("{base}/healthz"))
		.send()
		.await
		.expect("Health request should reach the server.");

	assert_eq!(response.status().as_u16(), 200);
}
