//! Authorization-request options and the base query parameters derived from them.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::ScopeSet, provider::Provider};

/// Query parameters appended to the authorization URL.
pub type AuthorizationParams = BTreeMap<String, String>;

pub(crate) const STATE_LEN: usize = 32;

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Caller-supplied options for building an authorization URL.
///
/// Every field is optional; the provider fills in defaults (a random state, its default scopes,
/// `approval_prompt=auto`).
#[derive(Clone, Debug, Default)]
pub struct AuthorizationOptions {
	/// Opaque CSRF state; generated when absent.
	pub state: Option<String>,
	/// Scopes to request instead of the provider defaults.
	pub scopes: Option<ScopeSet>,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Option<Url>,
	/// `approval_prompt` value for providers that support it.
	pub approval_prompt: Option<String>,
	/// `prompt` value (`none`, `consent`, `login`, ...) for providers that support it.
	pub prompt: Option<String>,
	/// PKCE code challenge.
	pub code_challenge: Option<String>,
	/// PKCE challenge method, sent alongside `code_challenge`.
	pub code_challenge_method: Option<PkceCodeChallengeMethod>,
	/// Extra query parameters; never override the standard ones.
	pub extra: BTreeMap<String, String>,
}
impl AuthorizationOptions {
	/// Sets the state value.
	pub fn with_state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Sets the requested scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Sets the redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Sets `approval_prompt`.
	pub fn with_approval_prompt(mut self, approval_prompt: impl Into<String>) -> Self {
		self.approval_prompt = Some(approval_prompt.into());

		self
	}

	/// Sets `prompt`.
	pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.prompt = Some(prompt.into());

		self
	}

	/// Sets the PKCE challenge and its method.
	pub fn with_code_challenge(
		mut self,
		code_challenge: impl Into<String>,
		method: PkceCodeChallengeMethod,
	) -> Self {
		self.code_challenge = Some(code_challenge.into());
		self.code_challenge_method = Some(method);

		self
	}

	/// Adds an extra query parameter.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}
}

/// Builds the standard authorization parameters shared by every provider.
///
/// Produces `state`, `scope` (joined with the provider's separator, omitted when empty),
/// `response_type=code`, `approval_prompt`, `redirect_uri`, `client_id`, and the PKCE pair.
pub fn base_authorization_parameters<P>(
	provider: &P,
	options: &AuthorizationOptions,
) -> AuthorizationParams
where
	P: ?Sized + Provider,
{
	let mut params = AuthorizationParams::new();
	let state = options.state.clone().unwrap_or_else(|| random_string(STATE_LEN));
	let scopes = options.scopes.clone().unwrap_or_else(|| provider.default_scopes());

	params.insert("state".into(), state);

	if !scopes.is_empty() {
		params.insert("scope".into(), scopes.join(provider.scope_separator()));
	}

	params.insert("response_type".into(), "code".into());
	params.insert(
		"approval_prompt".into(),
		options.approval_prompt.clone().unwrap_or_else(|| "auto".into()),
	);

	if let Some(redirect_uri) = &options.redirect_uri {
		params.insert("redirect_uri".into(), redirect_uri.to_string());
	}

	params.insert("client_id".into(), provider.credentials().client_id().to_owned());

	if let Some(challenge) = &options.code_challenge {
		let method = options.code_challenge_method.unwrap_or(PkceCodeChallengeMethod::S256);

		params.insert("code_challenge".into(), challenge.clone());
		params.insert("code_challenge_method".into(), method.as_str().into());
	}

	for (key, value) in &options.extra {
		params.entry(key.clone()).or_insert_with(|| value.clone());
	}

	params
}

pub(crate) fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
