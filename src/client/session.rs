//! Authorization-redirect state carried between [`Client::authorize`] and
//! [`Client::exchange_code`].

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	client::Client,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::{
		AuthorizationOptions, PkceCodeChallengeMethod, Provider,
		authorization::{STATE_LEN, random_string},
	},
};

const PKCE_VERIFIER_LEN: usize = 64;

/// Handshake metadata returned by [`Client::authorize`].
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Scopes requested in the authorization URL.
	pub scopes: ScopeSet,
	/// Redirect URI sent with the authorization request, if any.
	pub redirect_uri: Option<Url>,
	/// Authorization URL the end user should be sent to.
	pub authorize_url: Url,
	pkce: Option<PkcePair>,
}
impl AuthorizationSession {
	/// PKCE code challenge, when the session uses PKCE.
	pub fn code_challenge(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.challenge.as_str())
	}

	/// PKCE challenge method, when the session uses PKCE.
	pub fn code_challenge_method(&self) -> Option<PkceCodeChallengeMethod> {
		self.pkce.as_ref().map(|pkce| pkce.method)
	}

	/// Validates the `state` returned on the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(Error::StateMismatch) }
	}

	pub(super) fn pkce_verifier(&self) -> Option<&str> {
		self.pkce.as_ref().map(|pkce| pkce.verifier.as_str())
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("state", &self.state)
			.field("scopes", &self.scopes)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("code_challenge", &self.code_challenge())
			.field("code_challenge_method", &self.code_challenge_method())
			.finish()
	}
}

#[derive(Clone)]
struct PkcePair {
	verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	fn generate() -> Self {
		let verifier = random_string(PKCE_VERIFIER_LEN);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorization URL and the session needed to finish the exchange.
	///
	/// A random state is generated when `options` carries none, the provider's default scopes
	/// are used when it names none, and the client's redirect URI fills an empty one. When PKCE
	/// is enabled an S256 pair is generated unless `options` already carries a challenge.
	pub fn authorize(&self, options: AuthorizationOptions) -> Result<AuthorizationSession> {
		const KIND: OperationKind = OperationKind::Authorize;

		let _guard = OperationSpan::new(KIND, "authorize").entered();

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let session = self.build_session(options);

		obs::record_operation_outcome(KIND, OperationOutcome::Success);

		Ok(session)
	}

	fn build_session(&self, mut options: AuthorizationOptions) -> AuthorizationSession {
		let state = options.state.get_or_insert_with(|| random_string(STATE_LEN)).clone();
		let scopes = options.scopes.get_or_insert_with(|| self.provider.default_scopes()).clone();

		if options.redirect_uri.is_none() {
			options.redirect_uri = self.redirect_uri.clone();
		}

		let pkce = (self.use_pkce && options.code_challenge.is_none()).then(PkcePair::generate);

		if let Some(pkce) = &pkce {
			options = options.with_code_challenge(pkce.challenge.clone(), pkce.method);
		}

		let params = self.provider.authorization_parameters(&options);
		let mut authorize_url = self.provider.authorization_url();

		authorize_url.query_pairs_mut().extend_pairs(&params);

		AuthorizationSession {
			state,
			scopes,
			redirect_uri: options.redirect_uri,
			authorize_url,
			pkce,
		}
	}
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let digest = Sha256::digest(verifier.as_bytes());

	URL_SAFE_NO_PAD.encode(digest)
}
