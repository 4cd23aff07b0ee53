//! OAuth client credentials and the Basic authorization value derived from them.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Client identifier and secret issued by the provider's developer console.
///
/// Both values are validated as non-empty on construction. The secret never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	client_id: String,
	client_secret: TokenSecret,
}
impl ClientCredentials {
	/// Validates and stores the client id and secret.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let client_secret = client_secret.into();

		if client_id.is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_id" });
		}
		if client_secret.is_empty() {
			return Err(ConfigError::MissingCredential { field: "client_secret" });
		}

		Ok(Self { client_id, client_secret: TokenSecret::new(client_secret) })
	}

	/// Public client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Client secret wrapper.
	pub fn client_secret(&self) -> &TokenSecret {
		&self.client_secret
	}

	/// `Basic <base64(client_id:client_secret)>` using standard, padded base64.
	///
	/// The pair is encoded verbatim; it is not form-encoded first.
	pub fn basic_authorization(&self) -> String {
		let pair = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(pair))
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}
