//! Service credential model returned by the identity exchange.

// self
use crate::{_prelude::*, auth::secret::TokenSecret};

/// Lifecycle status for a service credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialStatus {
	/// Credential is currently valid.
	Active,
	/// Credential exceeded its expiry instant.
	Expired,
}

/// Vendor-scoped bearer credential obtained via the client-credentials grant.
///
/// Never persisted; the broker acquires a fresh one for every request that
/// misses the embed-token cache and drops it when the request completes.
#[derive(Clone, Debug)]
pub struct ServiceCredential {
	/// Bearer secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from the provider's `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl ServiceCredential {
	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		if instant >= self.expires_at {
			CredentialStatus::Expired
		} else {
			CredentialStatus::Active
		}
	}

	/// Returns `true` if the credential has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Expired)
	}

	/// Bearer value for `Authorization` headers.
	pub fn bearer(&self) -> &str {
		self.access_token.expose()
	}
}
