//! Fitbit OAuth 2.0 provider binding layered on top of the `oauth2` crate.
//!
//! [`provider::Fitbit`] is the binding itself: a stateless value that knows Fitbit's URLs,
//! scopes, and response conventions. [`client::Client`] is the generic engine that drives any
//! [`provider::Provider`] over a pluggable [`http::ProviderHttpClient`] transport.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ext;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Helpers for integration tests; enabled via `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{Client, FitbitClient},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::fitbit::Fitbit,
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`FitbitClient`] over the insecure test transport.
	pub fn build_reqwest_test_client(fitbit: Fitbit) -> FitbitClient {
		Client::with_http_client(fitbit, test_reqwest_http_client(), ReqwestTransportErrorMapper)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use provider::fitbit::{Fitbit, FitbitUser, RateLimitInfo};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
