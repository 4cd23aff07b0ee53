//! Declarative configuration for the Fitbit binding.
//!
//! [`FitbitConfig`] deserializes from any serde format or loads from `FITBIT_*` environment
//! variables, and builds a [`Fitbit`] provider or a ready-to-use [`FitbitClient`].

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::ConfigError,
	provider::fitbit::{FITBIT_API_URL, FITBIT_WEB_URL, Fitbit},
};
#[cfg(feature = "reqwest")] use crate::client::FitbitClient;

/// Environment variable holding the OAuth client id.
pub const ENV_CLIENT_ID: &str = "FITBIT_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "FITBIT_CLIENT_SECRET";
/// Environment variable holding the registered redirect URI.
pub const ENV_REDIRECT_URI: &str = "FITBIT_REDIRECT_URI";
/// Environment variable holding space-separated default scopes.
pub const ENV_SCOPES: &str = "FITBIT_SCOPES";
/// Environment variable holding the `Accept-Language` value for resource requests.
pub const ENV_ACCEPT_LANGUAGE: &str = "FITBIT_ACCEPT_LANGUAGE";
/// Environment variable holding the `Accept-Locale` value for resource requests.
pub const ENV_ACCEPT_LOCALE: &str = "FITBIT_ACCEPT_LOCALE";

/// Settings needed to build a Fitbit provider and engine.
#[derive(Clone, Serialize, Deserialize)]
pub struct FitbitConfig {
	/// OAuth client id issued by Fitbit.
	pub client_id: String,
	/// OAuth client secret issued by Fitbit.
	pub client_secret: TokenSecret,
	/// Redirect URI registered with the application.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub redirect_uri: Option<Url>,
	/// Scopes replacing the binding's defaults.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scopes: Option<ScopeSet>,
	/// `Accept-Language` sent on resource requests.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accept_language: Option<String>,
	/// `Accept-Locale` sent on resource requests.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accept_locale: Option<String>,
	/// Base URL of the authorization host.
	#[serde(default = "default_web_base_url")]
	pub web_base_url: String,
	/// Base URL of the token, revoke, and resource host.
	#[serde(default = "default_api_base_url")]
	pub api_base_url: String,
	/// Whether authorization sessions use PKCE.
	#[serde(default = "default_pkce")]
	pub pkce: bool,
}
impl FitbitConfig {
	/// Creates a configuration with Fitbit's production hosts and no optional settings.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			redirect_uri: None,
			scopes: None,
			accept_language: None,
			accept_locale: None,
			web_base_url: default_web_base_url(),
			api_base_url: default_api_base_url(),
			pkce: default_pkce(),
		}
	}

	/// Loads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through `lookup`, which maps a variable name to its value.
	///
	/// [`ENV_CLIENT_ID`] and [`ENV_CLIENT_SECRET`] are required; blank optional values are
	/// treated as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let client_id =
			optional(ENV_CLIENT_ID).ok_or(ConfigError::MissingEnvironment { name: ENV_CLIENT_ID })?;
		let client_secret = optional(ENV_CLIENT_SECRET)
			.ok_or(ConfigError::MissingEnvironment { name: ENV_CLIENT_SECRET })?;
		let mut config = Self::new(client_id, client_secret);

		if let Some(raw) = optional(ENV_REDIRECT_URI) {
			config.redirect_uri =
				Some(Url::parse(&raw).map_err(|source| ConfigError::InvalidRedirect { source })?);
		}
		if let Some(raw) = optional(ENV_SCOPES) {
			config.scopes = Some(ScopeSet::from_str(&raw)?);
		}

		config.accept_language = optional(ENV_ACCEPT_LANGUAGE);
		config.accept_locale = optional(ENV_ACCEPT_LOCALE);

		Ok(config)
	}

	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Overrides the authorization and API base URLs.
	pub fn with_base_urls(mut self, web: impl Into<String>, api: impl Into<String>) -> Self {
		self.web_base_url = web.into();
		self.api_base_url = api.into();

		self
	}

	/// Builds the provider binding described by this configuration.
	pub fn build_provider(&self) -> Result<Fitbit, ConfigError> {
		let mut provider = Fitbit::new(self.client_id.as_str(), self.client_secret.expose())?
			.with_base_urls(&self.web_base_url, &self.api_base_url)?;

		if let Some(scopes) = &self.scopes {
			provider = provider.with_default_scopes(scopes.clone());
		}
		if let Some(language) = &self.accept_language {
			provider = provider.with_accept_language(language)?;
		}
		if let Some(locale) = &self.accept_locale {
			provider = provider.with_accept_locale(locale)?;
		}

		Ok(provider)
	}

	/// Builds an engine over the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build_client(&self) -> Result<FitbitClient, ConfigError> {
		let mut client = FitbitClient::new(self.build_provider()?).with_pkce(self.pkce);

		if let Some(redirect_uri) = &self.redirect_uri {
			client = client.with_redirect_uri(redirect_uri.clone());
		}

		Ok(client)
	}
}
impl Debug for FitbitConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FitbitConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("redirect_uri", &self.redirect_uri)
			.field("scopes", &self.scopes)
			.field("accept_language", &self.accept_language)
			.field("accept_locale", &self.accept_locale)
			.field("web_base_url", &self.web_base_url)
			.field("api_base_url", &self.api_base_url)
			.field("pkce", &self.pkce)
			.finish()
	}
}

fn default_web_base_url() -> String {
	FITBIT_WEB_URL.into()
}

fn default_api_base_url() -> String {
	FITBIT_API_URL.into()
}

fn default_pkce() -> bool {
	true
}
