//! Request signing contracts that attach issued access tokens to arbitrary HTTP clients.

// crates.io
use oauth2::{
	HttpRequest,
	http::header::{AUTHORIZATION, HeaderValue},
};
// self
use crate::{_prelude::*, auth::AccessToken, error::ConfigError};

/// Describes how to attach an [`AccessToken`] to an outbound request without
/// constraining the HTTP client type.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the provided request and injects authorization state derived from `token`.
	fn attach_token(&self, request: Request, token: &AccessToken) -> Result<Request, Error>;
}

/// Adds `Authorization: Bearer <access token>` to resource requests.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerAuthorization;
impl BearerAuthorization {
	/// Builds the sensitive header value for `token`.
	pub fn header_value(&self, token: &AccessToken) -> Result<HeaderValue, ConfigError> {
		let mut value = HeaderValue::from_str(&format!("Bearer {}", token.access_token.expose()))
			.map_err(|source| ConfigError::InvalidHeaderValue { name: "Authorization", source })?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl RequestSignerExt<HttpRequest, ConfigError> for BearerAuthorization {
	fn attach_token(
		&self,
		mut request: HttpRequest,
		token: &AccessToken,
	) -> Result<HttpRequest, ConfigError> {
		request.headers_mut().insert(AUTHORIZATION, self.header_value(token)?);

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl RequestSignerExt<reqwest::RequestBuilder, ConfigError> for BearerAuthorization {
	fn attach_token(
		&self,
		request: reqwest::RequestBuilder,
		token: &AccessToken,
	) -> Result<reqwest::RequestBuilder, ConfigError> {
		Ok(request.bearer_auth(token.access_token.expose()))
	}
}
