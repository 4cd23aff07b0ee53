//! Fitbit Web API binding.
//!
//! Fitbit authenticates token and revoke requests with HTTP Basic client credentials, joins
//! scopes with spaces, rejects `approval_prompt`, and reports errors as an `errors` array of
//! `{ errorType, message }` objects. Every API response carries `Fitbit-Rate-Limit-*` headers
//! that [`Fitbit::rate_limit`] exposes as a [`RateLimitInfo`].

mod rate_limit;
mod user;

pub use rate_limit::*;
pub use user::*;

// crates.io
use oauth2::{
	HttpRequest,
	http::{HeaderMap, Method, Request, Response, StatusCode, header::HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials, ScopeSet},
	error::{ConfigError, IdentityProviderError, ResourceOwnerError},
	provider::{
		AuthorizationOptions, AuthorizationParams, HttpBasicAuthOptionProvider, OptionProvider,
		Provider, base_authorization_parameters,
	},
};

/// Host serving the user-facing authorization page.
pub const FITBIT_WEB_URL: &str = "https://www.fitbit.com";
/// Host serving the token, revoke, and resource endpoints.
pub const FITBIT_API_URL: &str = "https://api.fitbit.com";
/// Scopes requested when the caller supplies none, in Fitbit's documented order.
pub const DEFAULT_SCOPES: [&str; 9] = [
	"activity",
	"heartrate",
	"location",
	"profile",
	"settings",
	"sleep",
	"social",
	"weight",
	"nutrition",
];

const ACCEPT_LANGUAGE: &str = "accept-language";
const ACCEPT_LOCALE: &str = "accept-locale";

/// Absolute endpoint URLs derived from the web and API base URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FitbitEndpoints {
	/// `{web}/oauth2/authorize`.
	pub authorization: Url,
	/// `{api}/oauth2/token`.
	pub token: Url,
	/// `{api}/1/user/-/profile.json`.
	pub resource_owner: Url,
	/// `{api}/oauth2/revoke`.
	pub revocation: Url,
}
impl FitbitEndpoints {
	/// Derives the endpoints from base URLs; trailing slashes are ignored.
	pub fn from_base_urls(web: &str, api: &str) -> Result<Self, ConfigError> {
		let web = web.trim_end_matches('/');
		let api = api.trim_end_matches('/');

		Ok(Self {
			authorization: endpoint("authorization", format!("{web}/oauth2/authorize"))?,
			token: endpoint("token", format!("{api}/oauth2/token"))?,
			resource_owner: endpoint("resource owner", format!("{api}/1/user/-/profile.json"))?,
			revocation: endpoint("revocation", format!("{api}/oauth2/revoke"))?,
		})
	}
}

/// Fitbit provider binding.
///
/// A plain value: it issues no requests itself and is shared freely across tasks.
#[derive(Clone, Debug)]
pub struct Fitbit {
	credentials: ClientCredentials,
	option_provider: HttpBasicAuthOptionProvider,
	endpoints: FitbitEndpoints,
	default_scopes: ScopeSet,
	resource_headers: HeaderMap,
}
impl Fitbit {
	/// Creates the binding; both credentials must be non-empty.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let credentials = ClientCredentials::new(client_id, client_secret)?;
		let option_provider = HttpBasicAuthOptionProvider::new(&credentials)?;

		Ok(Self {
			credentials,
			option_provider,
			endpoints: FitbitEndpoints::from_base_urls(FITBIT_WEB_URL, FITBIT_API_URL)?,
			default_scopes: ScopeSet::new(DEFAULT_SCOPES)?,
			resource_headers: HeaderMap::new(),
		})
	}

	/// Points the binding at different hosts, e.g. a mock server.
	pub fn with_base_urls(mut self, web: &str, api: &str) -> Result<Self, ConfigError> {
		self.endpoints = FitbitEndpoints::from_base_urls(web, api)?;

		Ok(self)
	}

	/// Replaces the scopes requested when the caller supplies none.
	pub fn with_default_scopes(mut self, scopes: ScopeSet) -> Self {
		self.default_scopes = scopes;

		self
	}

	/// Sends `Accept-Language` on resource requests; selects the unit system (`en_US`,
	/// `en_GB`, ...).
	pub fn with_accept_language(self, language: &str) -> Result<Self, ConfigError> {
		self.with_resource_header(ACCEPT_LANGUAGE, "Accept-Language", language)
	}

	/// Sends `Accept-Locale` on resource requests; selects the response locale.
	pub fn with_accept_locale(self, locale: &str) -> Result<Self, ConfigError> {
		self.with_resource_header(ACCEPT_LOCALE, "Accept-Locale", locale)
	}

	/// Resolved endpoint URLs.
	pub fn endpoints(&self) -> &FitbitEndpoints {
		&self.endpoints
	}

	/// Rate-limit snapshot of any Fitbit response.
	pub fn rate_limit<B>(&self, response: &Response<B>) -> RateLimitInfo {
		RateLimitInfo::from_response(response)
	}

	fn with_resource_header(
		mut self,
		key: &'static str,
		name: &'static str,
		value: &str,
	) -> Result<Self, ConfigError> {
		let value = HeaderValue::from_str(value)
			.map_err(|source| ConfigError::InvalidHeaderValue { name, source })?;

		self.resource_headers.insert(key, value);

		Ok(self)
	}
}
impl Provider for Fitbit {
	type ResourceOwner = FitbitUser;

	fn credentials(&self) -> &ClientCredentials {
		&self.credentials
	}

	fn option_provider(&self) -> &dyn OptionProvider {
		&self.option_provider
	}

	fn authorization_url(&self) -> Url {
		self.endpoints.authorization.clone()
	}

	fn token_url(&self, _: &BTreeMap<String, String>) -> Url {
		self.endpoints.token.clone()
	}

	fn resource_owner_details_url(&self, _: &AccessToken) -> Url {
		self.endpoints.resource_owner.clone()
	}

	fn default_scopes(&self) -> ScopeSet {
		self.default_scopes.clone()
	}

	fn scope_separator(&self) -> &str {
		" "
	}

	fn authorization_parameters(&self, options: &AuthorizationOptions) -> AuthorizationParams {
		let mut params = base_authorization_parameters(self, options);

		params.remove("approval_prompt");

		if let Some(prompt) = options.prompt.as_deref().filter(|prompt| !prompt.is_empty()) {
			params.insert("prompt".into(), prompt.to_owned());
		}

		params
	}

	fn check_response(
		&self,
		status: StatusCode,
		body: &Value,
	) -> Result<(), IdentityProviderError> {
		if status.as_u16() < 400 {
			return Ok(());
		}

		Err(IdentityProviderError::new(error_message(status, body), status.as_u16(), body.clone()))
	}

	fn create_resource_owner(
		&self,
		body: Value,
		_: &AccessToken,
	) -> Result<FitbitUser, ResourceOwnerError> {
		FitbitUser::from_response(body)
	}

	fn access_token_resource_owner_id(&self) -> Option<&str> {
		Some("user_id")
	}

	fn revocation_request(&self, token: &AccessToken) -> Result<HttpRequest, ConfigError> {
		let options = self.option_provider.access_token_options(&Method::POST, &BTreeMap::new());
		let mut url = self.endpoints.revocation.clone();

		url.query_pairs_mut().append_pair("token", token.access_token.expose());

		let mut request = Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.body(options.body.unwrap_or_default().into_bytes())?;

		request.headers_mut().extend(options.headers);

		Ok(request)
	}

	fn resource_headers(&self) -> HeaderMap {
		self.resource_headers.clone()
	}
}

fn endpoint(name: &'static str, raw: String) -> Result<Url, ConfigError> {
	Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: name, source })
}

/// Joins each entry's values with `" - "` and the entries with `" , "`; falls back to the
/// reason phrase when the body has no usable `errors`.
fn error_message(status: StatusCode, body: &Value) -> String {
	let entries = match body.get("errors") {
		Some(Value::Array(entries)) if !entries.is_empty() =>
			entries.iter().map(join_entry).collect::<Vec<_>>(),
		Some(Value::Object(entries)) if !entries.is_empty() =>
			entries.values().map(join_entry).collect(),
		_ => return status.canonical_reason().unwrap_or(status.as_str()).to_owned(),
	};

	entries.join(" , ")
}

fn join_entry(entry: &Value) -> String {
	match entry {
		Value::Object(fields) => fields.values().map(text).collect::<Vec<_>>().join(" - "),
		Value::Array(items) => items.iter().map(text).collect::<Vec<_>>().join(" - "),
		scalar => text(scalar),
	}
}

fn text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}
