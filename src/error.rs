//! Crate-level error types shared by the provider binding, the engine, and transports.

// self
use crate::{_prelude::*, provider::ProviderErrorKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The identity provider answered with an HTTP error status.
	#[error(transparent)]
	IdentityProvider(#[from] IdentityProviderError),
	/// The profile payload could not be turned into a resource owner.
	#[error(transparent)]
	ResourceOwner(#[from] ResourceOwnerError),
	/// Unexpected or malformed upstream response; the caller may retry.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The `state` returned by the authorization redirect does not match the session.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A client credential was empty.
	#[error("Missing required option: {field}.")]
	MissingCredential {
		/// Name of the missing option (`client_id` or `client_secret`).
		field: &'static str,
	},
	/// A required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnvironment {
		/// Variable name.
		name: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An endpoint URL could not be parsed.
	#[error("The {endpoint} endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A header value contains characters HTTP does not allow.
	#[error("The {name} header value is invalid.")]
	InvalidHeaderValue {
		/// Header name.
		name: &'static str,
		/// Underlying validation failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// Scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// The provider does not implement the requested operation.
	#[error("The provider does not support {operation}.")]
	Unsupported {
		/// Operation label.
		operation: &'static str,
	},
	/// The access token carries no refresh token.
	#[error("Access token is missing a refresh token.")]
	MissingRefreshToken,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Error status reported by [`Provider::check_response`](crate::provider::Provider).
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("Identity provider returned HTTP {status}: {message}")]
pub struct IdentityProviderError {
	/// Message derived from the response body or the HTTP reason phrase.
	pub message: String,
	/// HTTP status code.
	pub status: u16,
	/// Decoded response body; text when it was not JSON, `null` when it was empty.
	pub body: Value,
	/// `Retry-After` hint captured by the transport, if any.
	pub retry_after: Option<Duration>,
}
impl IdentityProviderError {
	/// Creates an error for the provided message, status, and decoded body.
	pub fn new(message: impl Into<String>, status: u16, body: Value) -> Self {
		Self { message: message.into(), status, body, retry_after: None }
	}

	/// Attaches a retry hint observed on the response.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Iterates the `errorType` values of a Fitbit-style `errors` array.
	pub fn error_types(&self) -> impl Iterator<Item = &str> {
		self.body
			.get("errors")
			.and_then(Value::as_array)
			.into_iter()
			.flatten()
			.filter_map(|entry| entry.get("errorType").and_then(Value::as_str))
	}

	/// Classifies the failure so callers can decide between refreshing, re-authorizing, and
	/// retrying later.
	pub fn kind(&self) -> ProviderErrorKind {
		ProviderErrorKind::classify(self.status, self.error_types())
	}
}

/// Failures raised while building a resource owner from a profile payload.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ResourceOwnerError {
	/// The response has no `user` key.
	#[error("Invalid response: missing \"user\" key.")]
	MissingUser,
	/// The `user` key is present but is not a JSON object.
	#[error("Invalid response: \"user\" is not an object.")]
	InvalidUser,
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("Provider returned an unexpected response: {message}.")]
	UnexpectedResponse {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Provider responded with malformed JSON that could not be parsed.
	#[error("Provider returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
