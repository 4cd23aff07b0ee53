// std
use std::collections::HashMap;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use time::Duration;
// self
use oauth2_fitbit::{
	Fitbit,
	_preludet::build_reqwest_test_client,
	auth::{AccessToken, ScopeSet},
	client::FitbitClient,
	error::{ConfigError, Error, IdentityProviderError, ResourceOwnerError},
	oauth::oauth2::http::{Method, StatusCode},
	provider::{AuthorizationOptions, ProviderErrorKind},
	url::Url,
};

const CLIENT_ID: &str = "22942C";
const CLIENT_SECRET: &str = "secret-it";
const BASIC: &str = "Basic MjI5NDJDOnNlY3JldC1pdA==";

fn redirect_uri() -> Url {
	Url::parse("https://app.example.com/callback").expect("Redirect URI should parse successfully.")
}

fn build_client(server: &MockServer) -> FitbitClient {
	let fitbit = Fitbit::new(CLIENT_ID, CLIENT_SECRET)
		.and_then(|fitbit| fitbit.with_base_urls(&server.base_url(), &server.base_url()))
		.and_then(|fitbit| fitbit.with_accept_language("en_GB"))
		.expect("Fitbit binding should build for the mock server.");

	build_reqwest_test_client(fitbit).with_redirect_uri(redirect_uri())
}

fn identity_provider_error(err: Error) -> IdentityProviderError {
	match err {
		Error::IdentityProvider(err) => err,
		other => panic!("Expected an identity provider error, got {other:?}."),
	}
}

#[tokio::test]
async fn authorize_builds_fitbit_url() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let session = client
		.authorize(AuthorizationOptions::default().with_approval_prompt("force"))
		.expect("Authorization session should start successfully.");

	assert_eq!(session.state.len(), 32);
	assert!(session.validate_state(&session.state).is_ok());
	assert!(matches!(session.validate_state("forged"), Err(Error::StateMismatch)));
	assert_eq!(session.authorize_url.path(), "/oauth2/authorize");
	assert_eq!(session.redirect_uri.as_ref(), Some(&redirect_uri()));

	let pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
	assert_eq!(pairs.get("client_id").map(String::as_str), Some(CLIENT_ID));
	assert_eq!(pairs.get("state"), Some(&session.state));
	assert_eq!(pairs.get("redirect_uri").map(String::as_str), Some(redirect_uri().as_str()));
	assert_eq!(
		pairs.get("scope").map(String::as_str),
		Some("activity heartrate location profile settings sleep social weight nutrition")
	);
	assert_eq!(pairs.get("code_challenge").map(String::as_str), session.code_challenge());
	assert_eq!(pairs.get("code_challenge_method").map(String::as_str), Some("S256"));
	assert!(!pairs.contains_key("approval_prompt"));
}

#[tokio::test]
async fn authorize_without_pkce_omits_challenge() {
	let server = MockServer::start_async().await;
	let client = build_client(&server).with_pkce(false);
	let scopes = ScopeSet::new(["sleep", "heartrate"]).expect("Scopes should be valid.");
	let session = client
		.authorize(AuthorizationOptions::default().with_state("fixed").with_scopes(scopes))
		.expect("Authorization session should start successfully.");
	let pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(session.code_challenge(), None);
	assert!(!pairs.contains_key("code_challenge"));
	assert_eq!(pairs.get("state").map(String::as_str), Some("fixed"));
	assert_eq!(pairs.get("scope").map(String::as_str), Some("sleep heartrate"));
}

#[tokio::test]
async fn exchange_code_returns_user_id() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let session = client
		.authorize(AuthorizationOptions::default())
		.expect("Authorization session should start successfully.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.header("authorization", BASIC)
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "eyJhbGciOi",
				"expires_in": 28800,
				"refresh_token": "c643a63c072f0f05478e9d18b991db80ef6061e4f8e6c822d83fed53e5fafdd7",
				"scope": "heartrate profile sleep",
				"token_type": "Bearer",
				"user_id": "26FWFL"
			}));
		})
		.await;
	let token = client
		.exchange_code(&session, "1234567890")
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(token.access_token.expose(), "eyJhbGciOi");
	assert_eq!(token.token_type, "Bearer");
	assert_eq!(token.resource_owner_id.as_deref(), Some("26FWFL"));
	assert_eq!(token.values.get("user_id"), Some(&json!("26FWFL")));
	assert_eq!(
		token.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("c643a63c072f0f05478e9d18b991db80ef6061e4f8e6c822d83fed53e5fafdd7")
	);
	assert_eq!(
		token.scope.as_ref().map(|scope| scope.join(" ")).as_deref(),
		Some("heartrate profile sleep")
	);
	assert!(token.expires_at.is_some_and(|expires_at| expires_at > token.issued_at));
}

#[tokio::test]
async fn exchange_code_maps_fitbit_errors() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let session = client
		.authorize(AuthorizationOptions::default())
		.expect("Authorization session should start successfully.");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(400).header("content-type", "application/json").json_body(json!({
				"errors": [{
					"errorType": "invalid_grant",
					"message": "Authorization code invalid: 1234567890"
				}],
				"success": false
			}));
		})
		.await;
	let err = client
		.exchange_code(&session, "1234567890")
		.await
		.expect_err("Invalid codes must be rejected.");

	mock.assert_async().await;

	let err = identity_provider_error(err);

	assert_eq!(err.message, "invalid_grant - Authorization code invalid: 1234567890");
	assert_eq!(err.status, 400);
	assert_eq!(err.kind(), ProviderErrorKind::InvalidGrant);
}

#[tokio::test]
async fn token_rate_limits_carry_retry_after() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let token = AccessToken::new("expired").with_refresh_token("refresh-1");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(429)
				.header("content-type", "application/json")
				.header("retry-after", "30")
				.json_body(json!({
					"errors": [{ "errorType": "system", "message": "Too many requests" }]
				}));
		})
		.await;
	let err = client.refresh_token(&token).await.expect_err("Throttled refresh must fail.");

	mock.assert_async().await;

	let err = identity_provider_error(err);

	assert_eq!(err.message, "system - Too many requests");
	assert_eq!(err.status, 429);
	assert_eq!(err.retry_after, Some(Duration::seconds(30)));
	assert_eq!(err.kind(), ProviderErrorKind::RateLimited);
	assert!(err.kind().is_retryable());
}

#[tokio::test]
async fn refresh_keeps_previous_refresh_token_and_owner() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let token = AccessToken::new("old-access")
		.with_refresh_token("refresh-1")
		.with_resource_owner_id("26FWFL");
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token").header("authorization", BASIC);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": "new-access",
				"expires_in": 3600,
				"token_type": "Bearer"
			}));
		})
		.await;
	let refreshed = client.refresh_token(&token).await.expect("Refresh should succeed.");

	mock.assert_async().await;

	assert_eq!(refreshed.access_token.expose(), "new-access");
	assert_eq!(refreshed.refresh_token.as_ref().map(|secret| secret.expose()), Some("refresh-1"));
	assert_eq!(refreshed.resource_owner_id.as_deref(), Some("26FWFL"));
}

#[tokio::test]
async fn refresh_requires_refresh_token() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let err = client
		.refresh_token(&AccessToken::new("access-only"))
		.await
		.expect_err("Refresh without a refresh token must fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingRefreshToken)));
}

#[tokio::test]
async fn malformed_token_responses_are_transient() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":42}");
		})
		.await;
	let err = client.client_credentials(None).await.expect_err("Malformed tokens must fail.");

	mock.assert_async().await;

	assert!(matches!(err, Error::Transient(_)));
}

#[tokio::test]
async fn resource_owner_parses_profile() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/1/user/-/profile.json")
				.header("authorization", "Bearer eyJhbGciOi")
				.header("accept-language", "en_GB");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"user": {
					"encodedId": "26FWFL",
					"displayName": "Jane",
					"fullName": "Jane Doe",
					"timezone": "Europe/London",
					"memberSince": "2016-05-09"
				}
			}));
		})
		.await;
	let user = client
		.resource_owner(&AccessToken::new("eyJhbGciOi"))
		.await
		.expect("Profile fetch should succeed.");

	mock.assert_async().await;

	assert_eq!(user.id(), Some("26FWFL"));
	assert_eq!(user.display_name(), Some("Jane"));
	assert_eq!(user.full_name(), Some("Jane Doe"));
	assert_eq!(user.timezone(), Some("Europe/London"));
	assert_eq!(user.member_since(), Some("2016-05-09"));
	assert_eq!(user.locale(), None);
}

#[tokio::test]
async fn resource_owner_maps_expired_tokens() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/1/user/-/profile.json");
			then.status(401).header("content-type", "application/json").json_body(json!({
				"errors": [{
					"errorType": "expired_token",
					"message": "Access token expired: eyJhbGciOi."
				}],
				"success": false
			}));
		})
		.await;
	let err = client
		.resource_owner(&AccessToken::new("eyJhbGciOi"))
		.await
		.expect_err("Expired tokens must be rejected.");

	mock.assert_async().await;

	let err = identity_provider_error(err);

	assert_eq!(err.status, 401);
	assert_eq!(err.message, "expired_token - Access token expired: eyJhbGciOi.");
	assert_eq!(err.kind(), ProviderErrorKind::ExpiredToken);
}

#[tokio::test]
async fn resource_owner_rejects_profiles_without_user() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/1/user/-/profile.json");
			then.status(200).header("content-type", "application/json").json_body(json!({}));
		})
		.await;
	let err = client
		.resource_owner(&AccessToken::new("eyJhbGciOi"))
		.await
		.expect_err("Profiles without user must be rejected.");

	mock.assert_async().await;

	assert!(matches!(err, Error::ResourceOwner(ResourceOwnerError::MissingUser)));
}

#[tokio::test]
async fn authenticated_requests_return_raw_responses() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/1/user/-/activities/date/2024-01-01.json")
				.header("authorization", "Bearer eyJhbGciOi")
				.header("accept-language", "en_GB");
			then.status(429)
				.header("fitbit-rate-limit-limit", "150")
				.header("fitbit-rate-limit-remaining", "0")
				.header("fitbit-rate-limit-reset", "1800")
				.header("retry-after", "1800")
				.body("{}");
		})
		.await;
	let url = Url::parse(&server.url("/1/user/-/activities/date/2024-01-01.json"))
		.expect("Resource URL should parse successfully.");
	let response = client
		.authenticated_request(Method::GET, &url, &AccessToken::new("eyJhbGciOi"))
		.await
		.expect("Error statuses are returned as responses.");

	mock.assert_async().await;

	let info = client.provider.rate_limit(&response);

	assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
	assert_eq!(info.retry_after_seconds(), Some(1800));
	assert_eq!(info.remaining_count(), Some(0));
	assert_eq!(info.limit(), Some("150"));
}

#[tokio::test]
async fn revoke_posts_token_query() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/revoke")
				.query_param("token", "eyJhbGciOi")
				.header("authorization", BASIC);
			then.status(200).body("{}");
		})
		.await;
	let response =
		client.revoke(&AccessToken::new("eyJhbGciOi")).await.expect("Revoke should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status(), StatusCode::OK);
}
