//! Fitbit rate-limit headers captured from any API response.

// crates.io
use oauth2::http::{HeaderMap, Response, StatusCode, header::AsHeaderName};
// self
use crate::_prelude::*;

const RETRY_AFTER: &str = "retry-after";
const RATE_LIMIT_LIMIT: &str = "fitbit-rate-limit-limit";
const RATE_LIMIT_REMAINING: &str = "fitbit-rate-limit-remaining";
const RATE_LIMIT_RESET: &str = "fitbit-rate-limit-reset";

/// Snapshot of the rate-limit headers on a single response.
///
/// Values are kept as the opaque strings Fitbit sent; the `*_count`/`*_seconds` helpers parse
/// them on demand. `Retry-After` is only read from `429 Too Many Requests` responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitInfo {
	retry_after: Option<String>,
	limit: Option<String>,
	remaining: Option<String>,
	reset: Option<String>,
}
impl RateLimitInfo {
	/// Creates a snapshot from raw values.
	pub fn new(
		retry_after: Option<String>,
		limit: Option<String>,
		remaining: Option<String>,
		reset: Option<String>,
	) -> Self {
		Self { retry_after, limit, remaining, reset }
	}

	/// Reads the snapshot from a status code and header map.
	pub fn from_parts(status: StatusCode, headers: &HeaderMap) -> Self {
		let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
			first_value(headers, RETRY_AFTER)
		} else {
			None
		};

		Self {
			retry_after,
			limit: first_value(headers, RATE_LIMIT_LIMIT),
			remaining: first_value(headers, RATE_LIMIT_REMAINING),
			reset: first_value(headers, RATE_LIMIT_RESET),
		}
	}

	/// Reads the snapshot from an HTTP response.
	pub fn from_response<B>(response: &Response<B>) -> Self {
		Self::from_parts(response.status(), response.headers())
	}

	/// `Retry-After` value of a 429 response.
	pub fn retry_after(&self) -> Option<&str> {
		self.retry_after.as_deref()
	}

	/// `Fitbit-Rate-Limit-Limit`: quota for the current window.
	pub fn limit(&self) -> Option<&str> {
		self.limit.as_deref()
	}

	/// `Fitbit-Rate-Limit-Remaining`: calls left in the current window.
	pub fn remaining(&self) -> Option<&str> {
		self.remaining.as_deref()
	}

	/// `Fitbit-Rate-Limit-Reset`: seconds until the window resets.
	pub fn reset(&self) -> Option<&str> {
		self.reset.as_deref()
	}

	/// `Retry-After` as whole seconds, when numeric.
	pub fn retry_after_seconds(&self) -> Option<u64> {
		parse_u64(self.retry_after.as_deref())
	}

	/// Window quota, when numeric.
	pub fn limit_count(&self) -> Option<u64> {
		parse_u64(self.limit.as_deref())
	}

	/// Remaining calls, when numeric.
	pub fn remaining_count(&self) -> Option<u64> {
		parse_u64(self.remaining.as_deref())
	}

	/// Seconds until the window resets, when numeric.
	pub fn reset_seconds(&self) -> Option<u64> {
		parse_u64(self.reset.as_deref())
	}

	/// Time until the window resets.
	pub fn reset_in(&self) -> Option<Duration> {
		self.reset_seconds().and_then(|secs| i64::try_from(secs).ok()).map(Duration::seconds)
	}
}
#[cfg(feature = "reqwest")]
impl From<&reqwest::Response> for RateLimitInfo {
	fn from(response: &reqwest::Response) -> Self {
		Self::from_parts(response.status(), response.headers())
	}
}

fn first_value(headers: &HeaderMap, name: impl AsHeaderName) -> Option<String> {
	headers.get(name).map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn parse_u64(value: Option<&str>) -> Option<u64> {
	value?.trim().parse().ok()
}
