// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet},
	client::{AuthorizationSession, Client},
	error::ConfigError,
	http::ProviderHttpClient,
	oauth::{self, TokenGrant, TransportErrorMapper},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	provider::Provider,
};

impl<P, C, M> Client<P, C, M>
where
	P: Provider,
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the authorization `code` returned on the redirect for an access token.
	///
	/// The session's PKCE verifier and redirect URI are sent alongside the code. Callers should
	/// run [`AuthorizationSession::validate_state`] first.
	pub async fn exchange_code(
		&self,
		session: &AuthorizationSession,
		code: &str,
	) -> Result<AccessToken> {
		let grant = TokenGrant::AuthorizationCode {
			code,
			pkce_verifier: session.pkce_verifier(),
			redirect_uri: session.redirect_uri.as_ref().or(self.redirect_uri.as_ref()),
		};

		self.run_grant(grant, "exchange_code").await
	}

	/// Redeems the refresh token carried by `token`.
	///
	/// Providers that rotate refresh tokens return a new one; when the response omits it, the
	/// previous refresh token is kept. The same applies to the resource-owner id.
	pub async fn refresh_token(&self, token: &AccessToken) -> Result<AccessToken> {
		let Some(refresh_token) = token.refresh_token.as_ref() else {
			obs::record_operation_outcome(OperationKind::RefreshToken, OperationOutcome::Failure);

			return Err(ConfigError::MissingRefreshToken.into());
		};
		let grant =
			TokenGrant::RefreshToken { refresh_token: refresh_token.expose(), scopes: None };
		let mut refreshed = self.run_grant(grant, "refresh_token").await?;

		if refreshed.refresh_token.is_none() {
			refreshed.refresh_token = Some(refresh_token.clone());
		}
		if refreshed.resource_owner_id.is_none() {
			refreshed.resource_owner_id = token.resource_owner_id.clone();
		}

		Ok(refreshed)
	}

	/// Performs the `client_credentials` grant, optionally narrowing the requested scopes.
	pub async fn client_credentials(&self, scopes: Option<&ScopeSet>) -> Result<AccessToken> {
		self.run_grant(TokenGrant::ClientCredentials { scopes }, "client_credentials").await
	}

	async fn run_grant(&self, grant: TokenGrant<'_>, stage: &'static str) -> Result<AccessToken> {
		let kind = grant.operation();
		let span = OperationSpan::new(kind, stage);

		obs::record_operation_outcome(kind, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				oauth::request_token(
					self.provider.as_ref(),
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					grant,
				)
				.await
			})
			.await;

		obs::record_operation_outcome(kind, OperationOutcome::of(&result));

		result
	}
}
