//! Bridge between providers and the `oauth2` crate.
//!
//! Token grants run through `oauth2`'s request builders. Every request they emit passes through
//! an [`OptionsHandle`], which applies the provider's [`OptionProvider`] (form body plus client
//! authentication) before the transport sends it. Responses are decoded into
//! [`AccessToken`] values and error bodies are handed to [`Provider::check_response`].

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AsyncHttpClient, AuthorizationCode, ClientId, EndpointNotSet, EndpointSet, ErrorResponse,
	ExtraTokenFields, HttpClientError, HttpRequest, HttpResponse, PkceCodeVerifier, RedirectUrl,
	RefreshToken, RequestTokenError, StandardRevocableToken, StandardTokenResponse,
	TokenResponse, TokenUrl,
	basic::{BasicRevocationErrorResponse, BasicTokenIntrospectionResponse, BasicTokenType},
	http::StatusCode,
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	error::{ConfigError, TransientError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::{self, OperationKind},
	provider::{OptionProvider, Provider},
};

type ProviderTokenResponse = StandardTokenResponse<ResourceOwnerFields, BasicTokenType>;
type ProviderOAuthClient = oauth2::Client<
	ProviderErrorBody,
	ProviderTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;
type ProviderRequestTokenError<E> = RequestTokenError<HttpClientError<E>, ProviderErrorBody>;

/// Token-response fields beyond the standard OAuth 2.0 set (`user_id` on Fitbit).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceOwnerFields {
	/// Remaining response fields keyed by name.
	#[serde(flatten)]
	pub values: BTreeMap<String, Value>,
}
impl ExtraTokenFields for ResourceOwnerFields {}

/// Raw JSON error body; interpretation is left to [`Provider::check_response`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderErrorBody(pub Value);
impl Display for ProviderErrorBody {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl ErrorResponse for ProviderErrorBody {}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		operation: OperationKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: OperationKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(operation, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(operation, meta, message),
			_ => map_generic_transport_error(operation, meta, "unknown failure"),
		}
	}
}

/// [`AsyncHttpClient`] adapter that applies a provider's [`OptionProvider`] to each request.
///
/// The form parameters `oauth2` encoded are decoded again and handed to the supplier; its
/// headers overwrite the request's and its body replaces the request body.
pub struct OptionsHandle<'o, H> {
	inner: &'o H,
	supplier: &'o dyn OptionProvider,
}
impl<'o, H> OptionsHandle<'o, H> {
	/// Wraps `inner` so requests are rewritten by `supplier`.
	pub fn new(inner: &'o H, supplier: &'o dyn OptionProvider) -> Self {
		Self { inner, supplier }
	}

	/// Applies the supplier to `request`.
	pub fn apply(&self, mut request: HttpRequest) -> HttpRequest {
		let params = form_urlencoded::parse(request.body())
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect::<BTreeMap<_, _>>();
		let options = self.supplier.access_token_options(request.method(), &params);

		request.headers_mut().extend(options.headers);

		if let Some(body) = options.body {
			*request.body_mut() = body.into_bytes();
		}

		request
	}
}
impl<'c, 'o, H> AsyncHttpClient<'c> for OptionsHandle<'o, H>
where
	'o: 'c,
	H: AsyncHttpClient<'c>,
{
	type Error = H::Error;
	type Future = H::Future;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		self.inner.call(self.apply(request))
	}
}

/// Grants the engine issues against the token endpoint.
#[derive(Clone, Copy, Debug)]
pub(crate) enum TokenGrant<'a> {
	AuthorizationCode {
		code: &'a str,
		pkce_verifier: Option<&'a str>,
		redirect_uri: Option<&'a Url>,
	},
	RefreshToken { refresh_token: &'a str, scopes: Option<&'a ScopeSet> },
	ClientCredentials { scopes: Option<&'a ScopeSet> },
}
impl TokenGrant<'_> {
	pub(crate) fn operation(&self) -> OperationKind {
		match self {
			TokenGrant::AuthorizationCode { .. } => OperationKind::ExchangeCode,
			TokenGrant::RefreshToken { .. } => OperationKind::RefreshToken,
			TokenGrant::ClientCredentials { .. } => OperationKind::ClientCredentials,
		}
	}

	fn grant_type(&self) -> &'static str {
		match self {
			TokenGrant::AuthorizationCode { .. } => "authorization_code",
			TokenGrant::RefreshToken { .. } => "refresh_token",
			TokenGrant::ClientCredentials { .. } => "client_credentials",
		}
	}
}

/// Runs `grant` against the provider's token endpoint.
pub(crate) async fn request_token<P, C, M>(
	provider: &P,
	http_client: &C,
	mapper: &M,
	grant: TokenGrant<'_>,
) -> Result<AccessToken>
where
	P: ?Sized + Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let url_params = BTreeMap::from([("grant_type".to_owned(), grant.grant_type().to_owned())]);
	let oauth_client: ProviderOAuthClient =
		oauth2::Client::new(ClientId::new(provider.credentials().client_id().to_owned()))
			.set_token_uri(TokenUrl::from_url(provider.token_url(&url_params)));
	let slot = ResponseMetadataSlot::default();
	let instrumented = http_client.with_metadata(slot.clone());
	let handle = OptionsHandle::new(&instrumented, provider.option_provider());
	let separator = provider.scope_separator();
	let response = match grant {
		TokenGrant::AuthorizationCode { code, pkce_verifier, redirect_uri } => {
			let mut request = oauth_client.exchange_code(AuthorizationCode::new(code.to_owned()));

			if let Some(verifier) = pkce_verifier {
				request = request.set_pkce_verifier(PkceCodeVerifier::new(verifier.to_owned()));
			}
			if let Some(redirect_uri) = redirect_uri {
				request = request
					.set_redirect_uri(Cow::Owned(RedirectUrl::from_url(redirect_uri.clone())));
			}

			request.request_async(&handle).await
		},
		TokenGrant::RefreshToken { refresh_token, scopes } => {
			let refresh_token = RefreshToken::new(refresh_token.to_owned());
			let mut request = oauth_client.exchange_refresh_token(&refresh_token);

			if let Some(scopes) = scopes.filter(|scopes| !scopes.is_empty()) {
				request = request.add_extra_param("scope", scopes.join(separator));
			}

			request.request_async(&handle).await
		},
		TokenGrant::ClientCredentials { scopes } => {
			let mut request = oauth_client.exchange_client_credentials();

			if let Some(scopes) = scopes.filter(|scopes| !scopes.is_empty()) {
				request = request.add_extra_param("scope", scopes.join(separator));
			}

			request.request_async(&handle).await
		},
	};

	match response {
		Ok(response) => into_access_token(provider, response),
		Err(err) => Err(map_request_error(provider, grant.operation(), slot.take(), err, mapper)),
	}
}

/// Sends a request that is not a token grant (profile, revoke, resource calls).
pub(crate) async fn send<C, M>(
	http_client: &C,
	mapper: &M,
	operation: OperationKind,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot.clone());

	handle
		.call(request)
		.await
		.map_err(|err| mapper.map_transport_error(operation, slot.take().as_ref(), err))
}

/// Runs `check_response` on an error status; a status the provider accepts becomes
/// [`TransientError::UnexpectedResponse`].
pub(crate) fn reject<P>(
	provider: &P,
	operation: OperationKind,
	status: StatusCode,
	body: Value,
	retry_after: Option<Duration>,
) -> Error
where
	P: ?Sized + Provider,
{
	match provider.check_response(status, &body) {
		Err(err) => {
			let err = err.with_retry_after(retry_after);

			obs::record_rejection(operation, &err);

			err.into()
		},
		Ok(()) => TransientError::UnexpectedResponse {
			message: format!("{operation} received HTTP {status}"),
			status: Some(status.as_u16()),
			retry_after,
		}
		.into(),
	}
}

/// Decodes an error body as JSON, falling back to its text; an empty body is `null`.
pub(crate) fn error_body(bytes: &[u8]) -> Value {
	if bytes.is_empty() {
		return Value::Null;
	}

	serde_json::from_slice(bytes)
		.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn into_access_token<P>(provider: &P, response: ProviderTokenResponse) -> Result<AccessToken>
where
	P: ?Sized + Provider,
{
	let token_type = match response.token_type() {
		BasicTokenType::Bearer => "Bearer".to_owned(),
		other => other.as_ref().to_owned(),
	};
	let values = response.extra_fields().values.clone();
	let mut token = AccessToken::new(response.access_token().secret().to_owned())
		.with_token_type(token_type);

	if let Some(expires_in) = response.expires_in() {
		let secs =
			i64::try_from(expires_in.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		token = token.with_expires_in(Duration::seconds(secs))?;
	}
	if let Some(refresh) = response.refresh_token() {
		token = token.with_refresh_token(refresh.secret().to_owned());
	}
	if let Some(scopes) = response.scopes() {
		let scope = ScopeSet::new(scopes.iter().map(|scope| scope.as_str()))
			.map_err(ConfigError::from)?;

		token = token.with_scope(scope);
	}
	if let Some(id) = provider
		.access_token_resource_owner_id()
		.and_then(|field| values.get(field))
		.and_then(resource_owner_id)
	{
		token = token.with_resource_owner_id(id);
	}

	Ok(token.with_values(values))
}

fn resource_owner_id(value: &Value) -> Option<String> {
	match value {
		Value::String(id) => Some(id.clone()),
		Value::Number(id) => Some(id.to_string()),
		_ => None,
	}
}

fn map_request_error<P, E, M>(
	provider: &P,
	operation: OperationKind,
	meta: Option<ResponseMetadata>,
	err: ProviderRequestTokenError<E>,
	mapper: &M,
) -> Error
where
	P: ?Sized + Provider,
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();
	let status = meta_status(meta_ref);
	let retry_after = meta_retry_after(meta_ref);
	let status_code = status.and_then(|code| StatusCode::from_u16(code).ok());
	let error_status = status_code.filter(|code| !code.is_success());

	match err {
		RequestTokenError::ServerResponse(ProviderErrorBody(body)) => reject(
			provider,
			operation,
			status_code.unwrap_or(StatusCode::BAD_REQUEST),
			body,
			retry_after,
		),
		RequestTokenError::Request(error) => mapper.map_transport_error(operation, meta_ref, error),
		RequestTokenError::Parse(source, body) => match error_status {
			Some(code) => reject(
				provider,
				operation,
				code,
				error_body(&body),
				retry_after,
			),
			None => TransientError::ResponseParse { source, status }.into(),
		},
		RequestTokenError::Other(message) => match error_status {
			Some(code) => reject(provider, operation, code, Value::Null, retry_after),
			None => TransientError::UnexpectedResponse {
				message: format!("Token endpoint returned an unexpected response: {message}"),
				status,
				retry_after,
			}
			.into(),
		},
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	operation: OperationKind,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::UnexpectedResponse {
			message: format!("{operation} timed out"),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	operation: OperationKind,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransientError::UnexpectedResponse {
		message: format!("HTTP client error during {operation}: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
