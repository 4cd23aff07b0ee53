//! Optional observability hooks for engine operations.
//!
//! # Feature Flags
//!
//! - `tracing` wraps each engine call in an `oauth2_fitbit.operation` span carrying the
//!   `operation` and `stage` fields, and emits a `warn` event when a provider rejects a response.
//! - `metrics` increments `oauth2_fitbit_operation_total`, labeled by `operation` and `outcome`.
//!
//! Both are no-ops when their feature is disabled.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Engine operations observed by the hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Authorization URL construction.
	Authorize,
	/// Authorization code exchange.
	ExchangeCode,
	/// Refresh token grant.
	RefreshToken,
	/// Client credentials grant.
	ClientCredentials,
	/// Resource-owner profile fetch.
	ResourceOwner,
	/// Bearer-authenticated resource request.
	AuthenticatedRequest,
	/// Token revocation.
	Revoke,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Authorize => "authorize",
			OperationKind::ExchangeCode => "exchange_code",
			OperationKind::RefreshToken => "refresh_token",
			OperationKind::ClientCredentials => "client_credentials",
			OperationKind::ResourceOwner => "resource_owner",
			OperationKind::AuthenticatedRequest => "authenticated_request",
			OperationKind::Revoke => "revoke",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an engine operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}

	/// Success or failure of `result`.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { Self::Success } else { Self::Failure }
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
