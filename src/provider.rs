//! Provider bindings and the capability trait the engine drives them through.
//!
//! [`Provider`] is the narrow contract a binding fulfils: endpoint URLs, default scopes and
//! their separator, authorization-parameter adjustments, response validation, resource-owner
//! construction, and the token option supplier. [`fitbit`] contains the Fitbit binding.

pub mod authorization;
pub mod classify;
pub mod fitbit;
pub mod options;

pub use authorization::*;
pub use classify::*;
pub use options::*;

// crates.io
use oauth2::{
	HttpRequest,
	http::{HeaderMap, StatusCode},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials, ScopeSet},
	error::{ConfigError, IdentityProviderError, ResourceOwnerError},
};

/// Capabilities a provider binding exposes to [`Client`](crate::client::Client).
///
/// Implementors only describe the provider; every HTTP call is issued by the engine.
pub trait Provider
where
	Self: 'static + Send + Sync,
{
	/// Value object built from the resource-owner details response.
	type ResourceOwner: Send;

	/// Client credentials used for token requests.
	fn credentials(&self) -> &ClientCredentials;

	/// Supplier that authenticates token-endpoint requests.
	fn option_provider(&self) -> &dyn OptionProvider;

	/// Authorization endpoint users are redirected to.
	fn authorization_url(&self) -> Url;

	/// Token endpoint for a request carrying `params`.
	fn token_url(&self, params: &BTreeMap<String, String>) -> Url;

	/// Endpoint returning the resource owner's profile.
	fn resource_owner_details_url(&self, token: &AccessToken) -> Url;

	/// Scopes requested when the caller supplies none.
	fn default_scopes(&self) -> ScopeSet;

	/// Separator used to join scopes in the authorization URL.
	fn scope_separator(&self) -> &str {
		","
	}

	/// Query parameters for the authorization URL.
	fn authorization_parameters(&self, options: &AuthorizationOptions) -> AuthorizationParams {
		base_authorization_parameters(self, options)
	}

	/// Validates a decoded response, failing for error statuses.
	fn check_response(&self, status: StatusCode, body: &Value)
	-> Result<(), IdentityProviderError>;

	/// Builds the resource owner from the decoded profile response.
	fn create_resource_owner(
		&self,
		body: Value,
		token: &AccessToken,
	) -> Result<Self::ResourceOwner, ResourceOwnerError>;

	/// Token-response field that identifies the resource owner, if any.
	fn access_token_resource_owner_id(&self) -> Option<&str> {
		None
	}

	/// Builds the token revocation request.
	fn revocation_request(&self, token: &AccessToken) -> Result<HttpRequest, ConfigError> {
		let _ = token;

		Err(ConfigError::Unsupported { operation: "revoke" })
	}

	/// Headers added to authenticated resource requests.
	fn resource_headers(&self) -> HeaderMap {
		HeaderMap::new()
	}
}
