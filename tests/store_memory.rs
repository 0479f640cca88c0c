// crates.io
use time::{Duration, OffsetDateTime};
// self
use embed_broker::{
	auth::{ReportId, TokenSecret, WorkspaceId},
	store::{EmbedRecord, EmbedTokenStore, MemoryStore, StoreKey},
};

fn key(workspace: &str, report: &str) -> StoreKey {
	StoreKey::new(
		WorkspaceId::new(workspace).expect("Workspace identifier should be valid for store tests."),
		ReportId::new(report).expect("Report identifier should be valid for store tests."),
	)
}

fn record(token: &str, expires_at: OffsetDateTime) -> EmbedRecord {
	EmbedRecord { token: TokenSecret::new(token), expires_at, report_name: "Report".into() }
}

#[tokio::test]
async fn put_then_get_round_trips_records() {
	let store = MemoryStore::new();
	let key = key("w1", "r1");

	assert!(store.get(&key).await.expect("Get on an empty store should succeed.").is_none());

	store
		.put(key.clone(), record("token-1", OffsetDateTime::now_utc() + Duration::hours(1)))
		.await
		.expect("Put should succeed.");

	let fetched = store
		.get(&key)
		.await
		.expect("Get should succeed.")
		.expect("Stored record should be returned.");

	assert_eq!(fetched.token.expose(), "token-1");
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn put_replaces_the_existing_record() {
	let store = MemoryStore::new();
	let key = key("w1", "r1");
	let expiry = OffsetDateTime::now_utc() + Duration::hours(1);

	store.put(key.clone(), record("token-old", expiry)).await.expect("First put should succeed.");
	store.put(key.clone(), record("token-new", expiry)).await.expect("Second put should succeed.");

	let fetched = store
		.get(&key)
		.await
		.expect("Get should succeed.")
		.expect("Replaced record should be returned.");

	assert_eq!(fetched.token.expose(), "token-new");
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn keys_are_scoped_per_pair() {
	let store = MemoryStore::new();
	let expiry = OffsetDateTime::now_utc() + Duration::hours(1);

	store.put(key("w1", "r1"), record("token-a", expiry)).await.expect("Put should succeed.");
	store.put(key("w1", "r2"), record("token-b", expiry)).await.expect("Put should succeed.");
	store.put(key("w2", "r1"), record("token-c", expiry)).await.expect("Put should succeed.");

	assert_eq!(store.len(), 3);

	let fetched = store
		.get(&key("w1", "r2"))
		.await
		.expect("Get should succeed.")
		.expect("Record for the pair should be returned.");

	assert_eq!(fetched.token.expose(), "token-b");
}

#[tokio::test]
async fn sweep_drops_only_expired_records() {
	let store = MemoryStore::new();
	let now = OffsetDateTime::now_utc();

	store.put(key("w1", "r1"), record("live", now + Duration::hours(1))).await.expect("Put should succeed.");
	store.put(key("w1", "r2"), record("stale", now - Duration::minutes(1))).await.expect("Put should succeed.");
	store.put(key("w2", "r1"), record("boundary", now)).await.expect("Put should succeed.");

	let dropped = store.sweep(now).await.expect("Sweep should succeed.");

	// Expiry is inclusive, so the boundary record goes too.
	assert_eq!(dropped, 2);
	assert_eq!(store.len(), 1);
	assert!(
		store
			.get(&key("w1", "r1"))
			.await
			.expect("Get should succeed.")
			.is_some(),
	);
}
