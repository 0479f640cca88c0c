//! Embed-token brokering with caching + singleflight guards.
//!
//! The broker exposes [`Broker::embed_report`] so callers reuse minted embed
//! tokens until the vendor-declared expiry. Each request acquires a per-pair
//! singleflight guard, so concurrent callers for the same (workspace, report)
//! piggy-back on one mint instead of stampeding the vendor. Cache hits serve a
//! portal-synthesized embed URL; misses exchange service credentials, mint a
//! fresh token, and fetch the canonical report details. Hit or miss, expired
//! records are swept before the call returns.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	flows::{
		Broker,
		common::{self, EmbedRequest},
	},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{EmbedRecord, EmbedTokenStore},
};

/// Everything a client needs to render one embedded report.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedGrant {
	/// Viewer-scoped embed token.
	pub embed_token: TokenSecret,
	/// Embed URL to load in the client-side viewer.
	pub embed_url: Url,
	/// Instant at which the token stops working.
	#[serde(with = "time::serde::rfc3339")]
	pub token_expiry: OffsetDateTime,
	/// Display name of the report.
	pub report_name: String,
}

impl Broker {
	/// Brokers an embed token for the pair, serving from cache when possible.
	pub async fn embed_report(&self, request: EmbedRequest) -> Result<EmbedGrant> {
		const KIND: FlowKind = FlowKind::EmbedToken;

		let span = FlowSpan::new(KIND, "embed_report");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let key = request.store_key();
				let guard = common::flow_guard(self, &key);
				let _singleflight = guard.lock().await;
				// One instant governs cache evaluation and the sweep below.
				let now = OffsetDateTime::now_utc();

				if let Some(current) = <dyn EmbedTokenStore>::get(self.store.as_ref(), &key)
					.await
					.map_err(Error::from)?
					.filter(|record| !record.is_expired_at(now))
				{
					// Hits sweep too; no broker call may leave expired records
					// behind.
					<dyn EmbedTokenStore>::sweep(self.store.as_ref(), now)
						.await
						.map_err(Error::from)?;

					let embed_url = self
						.endpoints
						.synthesized_embed_url(&request.workspace, &request.report)?;

					return Ok(EmbedGrant {
						embed_token: current.token,
						embed_url,
						token_expiry: current.expires_at,
						report_name: current.report_name,
					});
				}

				let credential = self.exchange.acquire().await?;
				let minted = self
					.api
					.generate_embed_token(&credential, &request.workspace, &request.report)
					.await?;
				let details = self
					.api
					.report_details(&credential, &request.workspace, &request.report)
					.await?;
				let record = EmbedRecord {
					token: minted.token.clone(),
					expires_at: minted.expiration,
					report_name: details.name.clone(),
				};

				<dyn EmbedTokenStore>::put(self.store.as_ref(), key, record)
					.await
					.map_err(Error::from)?;
				<dyn EmbedTokenStore>::sweep(self.store.as_ref(), now)
					.await
					.map_err(Error::from)?;

				Ok(EmbedGrant {
					embed_token: minted.token,
					embed_url: details.embed_url,
					token_expiry: minted.expiration,
					report_name: details.name,
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
