//! Access token issued by a provider's token endpoint.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Tokens and metadata returned by a successful token request.
///
/// Response fields without a dedicated slot are kept verbatim in [`values`](Self::values).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the provider (normally `Bearer`).
	pub token_type: String,
	/// Scopes the provider reports as granted, when present in the response.
	pub scope: Option<ScopeSet>,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Expiry instant derived from `expires_in`, if the provider sent one.
	pub expires_at: Option<OffsetDateTime>,
	/// Identifier of the user the token was issued for.
	pub resource_owner_id: Option<String>,
	/// Remaining token-response fields.
	pub values: BTreeMap<String, Value>,
}
impl AccessToken {
	/// Creates a bearer token issued now, without expiry or refresh token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			token_type: "Bearer".into(),
			scope: None,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
			resource_owner_id: None,
			values: BTreeMap::new(),
		}
	}

	/// Sets the refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Sets the token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = token_type.into();

		self
	}

	/// Sets the granted scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Overrides the issued-at instant. Call before [`with_expires_in`](Self::with_expires_in).
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Sets the expiry relative to the issued-at instant.
	///
	/// Fails when the resulting instant is outside the representable range.
	pub fn with_expires_in(mut self, lifetime: Duration) -> Result<Self, ConfigError> {
		self.expires_at =
			Some(self.issued_at.checked_add(lifetime).ok_or(ConfigError::ExpiresInOutOfRange)?);

		Ok(self)
	}

	/// Sets an absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the resource owner identifier.
	pub fn with_resource_owner_id(mut self, id: impl Into<String>) -> Self {
		self.resource_owner_id = Some(id.into());

		self
	}

	/// Replaces the extra response fields.
	pub fn with_values(mut self, values: BTreeMap<String, Value>) -> Self {
		self.values = values;

		self
	}

	/// Returns `true` if the token has expired at the provided instant.
	///
	/// Tokens without an expiry never expire.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining lifetime at the current clock, clamped at zero.
	pub fn expires_in(&self) -> Option<Duration> {
		let remaining = self.expires_at? - OffsetDateTime::now_utc();

		Some(remaining.max(Duration::ZERO))
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("resource_owner_id", &self.resource_owner_id)
			.field("values", &self.values.keys().collect::<Vec<_>>())
			.finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
