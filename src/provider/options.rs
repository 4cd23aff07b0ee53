//! Token-request option suppliers.
//!
//! An [`OptionProvider`] turns a method and a parameter map into the headers and body sent to
//! the token endpoint. [`HttpBasicAuthOptionProvider`] layers client authentication on top of the
//! form-encoding done by [`PostAuthOptionProvider`].

// crates.io
use oauth2::http::{
	HeaderMap, Method,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue},
};
use url::form_urlencoded::Serializer;
// self
use crate::{_prelude::*, auth::ClientCredentials, error::ConfigError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Headers and body for a single token-endpoint request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
	/// Headers to set on the request, overwriting existing values with the same name.
	pub headers: HeaderMap,
	/// Encoded body, when the method carries one.
	pub body: Option<String>,
}

/// Builds request options for token-endpoint calls.
pub trait OptionProvider
where
	Self: Send + Sync,
{
	/// Returns the headers and body for a token request with `params`.
	fn access_token_options(
		&self,
		method: &Method,
		params: &BTreeMap<String, String>,
	) -> RequestOptions;
}

/// Sends token parameters as a form-encoded POST body.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostAuthOptionProvider;
impl OptionProvider for PostAuthOptionProvider {
	fn access_token_options(
		&self,
		method: &Method,
		params: &BTreeMap<String, String>,
	) -> RequestOptions {
		let mut options = RequestOptions::default();

		if *method == Method::POST {
			options.headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
			options.body = Some(Serializer::new(String::new()).extend_pairs(params).finish());
		}

		options
	}
}

/// Form-encoded options plus `Authorization: Basic <base64(client_id:client_secret)>`.
#[derive(Clone)]
pub struct HttpBasicAuthOptionProvider {
	base: PostAuthOptionProvider,
	authorization: HeaderValue,
}
impl HttpBasicAuthOptionProvider {
	/// Precomputes the Basic header for `credentials`.
	pub fn new(credentials: &ClientCredentials) -> Result<Self, ConfigError> {
		let mut authorization = HeaderValue::from_str(&credentials.basic_authorization())
			.map_err(|source| ConfigError::InvalidHeaderValue { name: "Authorization", source })?;

		authorization.set_sensitive(true);

		Ok(Self { base: PostAuthOptionProvider, authorization })
	}
}
impl OptionProvider for HttpBasicAuthOptionProvider {
	fn access_token_options(
		&self,
		method: &Method,
		params: &BTreeMap<String, String>,
	) -> RequestOptions {
		let mut options = self.base.access_token_options(method, params);

		options.headers.insert(AUTHORIZATION, self.authorization.clone());

		options
	}
}
impl Debug for HttpBasicAuthOptionProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpBasicAuthOptionProvider")
			.field("authorization", &"<redacted>")
			.finish()
	}
}
