//! Coarse classification of identity-provider error responses.

/// Canonical provider error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad code or refresh token).
	InvalidGrant,
	/// Access token expired; refresh and retry.
	ExpiredToken,
	/// Client authentication failed or the token is not valid for this client.
	InvalidClient,
	/// Requested scopes exceed what the token covers.
	InsufficientScope,
	/// Rate limit exhausted; wait for the reset window.
	RateLimited,
	/// Failure is temporary and may be retried.
	Transient,
}
impl ProviderErrorKind {
	/// Classifies a failure from the HTTP status and the provider's error type strings.
	///
	/// `429` always wins, then the first recognized error type, then the status code.
	pub fn classify<'a>(status: u16, error_types: impl IntoIterator<Item = &'a str>) -> Self {
		if status == 429 {
			return Self::RateLimited;
		}
		if let Some(kind) = error_types.into_iter().find_map(match_error_type) {
			return kind;
		}

		classify_status(status)
	}

	/// Returns `true` when the same request may succeed later without caller changes.
	pub const fn is_retryable(self) -> bool {
		matches!(self, Self::RateLimited | Self::Transient)
	}
}

fn match_error_type(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("expired_token") {
		Some(ProviderErrorKind::ExpiredToken)
	} else if value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("access_denied")
	{
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
		|| value.eq_ignore_ascii_case("invalid_token")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("insufficient_scope")
		|| value.eq_ignore_ascii_case("insufficient_permissions")
		|| value.eq_ignore_ascii_case("invalid_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("system") {
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_status(status: u16) -> ProviderErrorKind {
	match status {
		400 | 404 | 410 => ProviderErrorKind::InvalidGrant,
		401 => ProviderErrorKind::InvalidClient,
		403 => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}
