// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	http::{
		Method, Request,
		header::{ACCEPT, HeaderValue},
	},
};
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::Client,
	error::{ConfigError, TransientError},
	ext::RequestSignerExt,
	http::{self, ProviderHttpClient},
	oauth::{self, TransportErrorMapper},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::Provider,
};

impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the resource owner's profile and hands it to the provider.
	///
	/// Error statuses go through [`Provider::check_response`]; a success body that is not JSON
	/// fails with [`TransientError::ResponseParse`].
	pub async fn resource_owner(&self, token: &AccessToken) -> Result<P::ResourceOwner> {
		const KIND: OperationKind = OperationKind::ResourceOwner;

		let span = OperationSpan::new(KIND, "resource_owner");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.provider.resource_owner_details_url(token);
				let mut request = self.signed_request(Method::GET, &url, token)?;

				request
					.headers_mut()
					.entry(ACCEPT)
					.or_insert(HeaderValue::from_static("application/json"));

				let response = oauth::send(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					KIND,
					request,
				)
				.await?;
				let body = self.decode_resource_body(KIND, &response)?;

				self.provider.create_resource_owner(body, token).map_err(Error::from)
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	/// Sends a bearer-authenticated request to an arbitrary provider resource.
	///
	/// The provider's resource headers are added. The response is returned as received,
	/// whatever its status.
	pub async fn authenticated_request(
		&self,
		method: Method,
		url: &Url,
		token: &AccessToken,
	) -> Result<HttpResponse> {
		const KIND: OperationKind = OperationKind::AuthenticatedRequest;

		let span = OperationSpan::new(KIND, "authenticated_request");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.signed_request(method, url, token)?;

				oauth::send(self.http_client.as_ref(), self.transport_mapper.as_ref(), KIND, request)
					.await
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	/// Revokes `token` at the provider's revocation endpoint.
	///
	/// The response is returned as received; providers without a revocation endpoint fail with
	/// [`ConfigError::Unsupported`].
	pub async fn revoke(&self, token: &AccessToken) -> Result<HttpResponse> {
		const KIND: OperationKind = OperationKind::Revoke;

		let span = OperationSpan::new(KIND, "revoke");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.provider.revocation_request(token)?;

				oauth::send(self.http_client.as_ref(), self.transport_mapper.as_ref(), KIND, request)
					.await
			})
			.await;

		obs::record_operation_outcome(KIND, OperationOutcome::of(&result));

		result
	}

	fn signed_request(
		&self,
		method: Method,
		url: &Url,
		token: &AccessToken,
	) -> Result<HttpRequest, ConfigError> {
		let mut request = Request::builder().method(method).uri(url.as_str()).body(Vec::new())?;

		request.headers_mut().extend(self.provider.resource_headers());

		self.signer.attach_token(request, token)
	}

	fn decode_resource_body(&self, kind: OperationKind, response: &HttpResponse) -> Result<Value> {
		let status = response.status();

		if status.is_client_error() || status.is_server_error() {
			return Err(oauth::reject(
				self.provider.as_ref(),
				kind,
				status,
				oauth::error_body(response.body()),
				http::parse_retry_after(response.headers()),
			));
		}

		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(response.body()))
			.map_err(|source| {
				TransientError::ResponseParse { source, status: Some(status.as_u16()) }.into()
			})
	}
}
