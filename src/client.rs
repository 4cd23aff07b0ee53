//! Engine that drives a [`Provider`] over a pluggable transport.
//!
//! [`Client`] owns no tokens and no mutable state. Each call asks the provider for URLs, scopes,
//! and token-request options, sends exactly one HTTP request through the transport, and hands
//! error statuses to [`Provider::check_response`]. Nothing is retried.

pub mod session;

mod resource;
mod token;

pub use session::*;

// self
use crate::{
	_prelude::*,
	ext::BearerAuthorization,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::Provider,
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper, provider::fitbit::Fitbit,
};

/// [`Client`] specialized for the Fitbit binding and the default reqwest transport.
#[cfg(feature = "reqwest")]
pub type FitbitClient = Client<Fitbit, ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Generic OAuth 2.0 engine composed with a provider binding.
pub struct Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Provider binding supplying endpoints, scopes, and response validation.
	pub provider: Arc<P>,
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Redirect URI sent with authorization and code-exchange requests.
	pub redirect_uri: Option<Url>,
	/// Whether [`Client::authorize`] generates a PKCE pair.
	pub use_pkce: bool,
	signer: BearerAuthorization,
}
impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an engine that reuses the caller-provided transport and mapper.
	pub fn with_http_client(
		provider: impl Into<Arc<P>>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			provider: provider.into(),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			redirect_uri: None,
			use_pkce: true,
			signer: BearerAuthorization,
		}
	}

	/// Sets the redirect URI registered with the provider.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Enables or disables PKCE (S256) for authorization sessions.
	pub fn with_pkce(mut self, enabled: bool) -> Self {
		self.use_pkce = enabled;

		self
	}
}
#[cfg(feature = "reqwest")]
impl<P> Client<P, ReqwestHttpClient, ReqwestTransportErrorMapper>
where
	P: Provider,
{
	/// Creates an engine backed by a default reqwest client.
	pub fn new(provider: impl Into<Arc<P>>) -> Self {
		Self::with_http_client(
			provider,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<P, C, M> Clone for Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			provider: Arc::clone(&self.provider),
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			redirect_uri: self.redirect_uri.clone(),
			use_pkce: self.use_pkce,
			signer: self.signer,
		}
	}
}
impl<P, C, M> Debug for Client<P, C, M>
where
	P: Provider + Debug,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("provider", &self.provider)
			.field("redirect_uri", &self.redirect_uri)
			.field("use_pkce", &self.use_pkce)
			.finish()
	}
}
