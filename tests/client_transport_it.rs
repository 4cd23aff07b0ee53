// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
use url::{Url, form_urlencoded};
// self
use oauth2_fitbit::{
	Fitbit,
	auth::AccessToken,
	client::Client,
	error::{Error, TransientError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{
			AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
			http::{
				Method, StatusCode,
				header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderValue},
			},
		},
	},
	obs::OperationKind,
};

const BASIC: &str = "Basic MjI5NDJDOnNlY3JldA==";

#[derive(Debug)]
enum FakeTransportError {
	Offline,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Offline => write!(f, "Transport offline."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone)]
enum Reply {
	Json(StatusCode, &'static str),
	Offline(ResponseMetadata),
}

#[derive(Clone)]
struct FakeHttpClient {
	reply: Reply,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}
impl FakeHttpClient {
	fn replying(status: StatusCode, body: &'static str) -> Self {
		Self { reply: Reply::Json(status, body), requests: Default::default() }
	}

	fn offline(meta: ResponseMetadata) -> Self {
		Self { reply: Reply::Offline(meta), requests: Default::default() }
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, reply: self.reply.clone(), requests: Arc::clone(&self.requests) }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	reply: Reply,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			assert!(
				self.slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			self.requests.lock().push(request);

			match &self.reply {
				Reply::Json(status, body) => {
					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() = *status;

					response
						.headers_mut()
						.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
					self.slot.store(ResponseMetadata {
						status: Some(status.as_u16()),
						retry_after: None,
					});

					Ok(response)
				},
				Reply::Offline(meta) => {
					self.slot.store(meta.clone());

					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Offline)))
				},
			}
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	seen: Arc<Mutex<Vec<(OperationKind, Option<ResponseMetadata>)>>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: OperationKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.seen.lock().push((operation, meta.cloned()));

		TransientError::UnexpectedResponse {
			message: format!("{operation} failed: {err}"),
			status: meta.and_then(|value| value.status),
			retry_after: meta.and_then(|value| value.retry_after),
		}
		.into()
	}
}

type FakeClient = Client<Fitbit, FakeHttpClient, RecordingTransportErrorMapper>;

fn fitbit() -> Fitbit {
	Fitbit::new("22942C", "secret")
		.and_then(|fitbit| fitbit.with_accept_language("en_US"))
		.expect("Fitbit binding should build.")
}

fn build_client(
	http_client: FakeHttpClient,
) -> (FakeClient, Arc<Mutex<Vec<HttpRequest>>>, RecordingTransportErrorMapper) {
	let requests = Arc::clone(&http_client.requests);
	let mapper = RecordingTransportErrorMapper::default();
	let client = Client::with_http_client(fitbit(), http_client, mapper.clone());

	(client, requests, mapper)
}

fn form(body: &[u8]) -> Vec<(String, String)> {
	form_urlencoded::parse(body).into_owned().collect()
}

#[tokio::test]
async fn revoke_issues_one_post_with_token_query() {
	let (client, requests, _) = build_client(FakeHttpClient::replying(StatusCode::OK, "{}"));
	let token = AccessToken::new("eyJ+hbG/ciOi=");
	let response = client.revoke(&token).await.expect("Revoke should succeed.");
	let requests = requests.lock();

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response.body().as_slice(), b"{}");
	assert_eq!(requests.len(), 1);

	let request = &requests[0];
	let url = Url::parse(&request.uri().to_string()).expect("Revoke URI should parse.");

	assert_eq!(request.method(), Method::POST);
	assert_eq!(url.origin().ascii_serialization(), "https://api.fitbit.com");
	assert_eq!(url.path(), "/oauth2/revoke");
	assert_eq!(
		url.query_pairs().into_owned().collect::<Vec<_>>(),
		[("token".to_owned(), "eyJ+hbG/ciOi=".to_owned())]
	);
	assert_eq!(
		request.headers().get(AUTHORIZATION).map(HeaderValue::as_bytes),
		Some(BASIC.as_bytes())
	);
	assert!(request.body().is_empty());
}

#[tokio::test]
async fn revoke_returns_error_statuses_uninterpreted() {
	let (client, requests, mapper) = build_client(FakeHttpClient::replying(
		StatusCode::UNAUTHORIZED,
		"{\"errors\":[{\"errorType\":\"invalid_client\",\"message\":\"Invalid authorization header.\"}]}",
	));
	let response = client
		.revoke(&AccessToken::new("eyJhbGciOi"))
		.await
		.expect("Revoke returns the response.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(requests.lock().len(), 1);
	assert!(mapper.seen.lock().is_empty());
}

#[tokio::test]
async fn token_requests_use_basic_authentication() {
	let (client, requests, _) = build_client(FakeHttpClient::replying(
		StatusCode::OK,
		"{\"access_token\":\"new-access\",\"refresh_token\":\"r-2\",\"token_type\":\"Bearer\",\"expires_in\":28800,\"user_id\":\"26FWFL\"}",
	));
	let token = AccessToken::new("old-access").with_refresh_token("r+1");
	let refreshed = client.refresh_token(&token).await.expect("Refresh should succeed.");
	let requests = requests.lock();
	let request = &requests[0];
	let params = form(request.body());

	assert_eq!(refreshed.access_token.expose(), "new-access");
	assert_eq!(refreshed.refresh_token.as_ref().map(|secret| secret.expose()), Some("r-2"));
	assert_eq!(refreshed.resource_owner_id.as_deref(), Some("26FWFL"));
	assert_eq!(requests.len(), 1);
	assert_eq!(request.method(), Method::POST);
	assert_eq!(request.uri().to_string(), "https://api.fitbit.com/oauth2/token");
	assert_eq!(
		request.headers().get(AUTHORIZATION).map(HeaderValue::as_bytes),
		Some(BASIC.as_bytes())
	);
	assert_eq!(
		request.headers().get(CONTENT_TYPE).map(HeaderValue::as_bytes),
		Some(&b"application/x-www-form-urlencoded"[..])
	);
	assert_eq!(request.headers().get_all(CONTENT_TYPE).iter().count(), 1);
	assert!(params.contains(&("grant_type".to_owned(), "refresh_token".to_owned())));
	assert!(params.contains(&("refresh_token".to_owned(), "r+1".to_owned())));
	assert!(params.iter().all(|(key, _)| key != "client_secret"));
}

#[tokio::test]
async fn code_exchange_sends_pkce_verifier_and_redirect() {
	let (client, requests, _) = build_client(FakeHttpClient::replying(
		StatusCode::OK,
		"{\"access_token\":\"eyJhbGciOi\",\"token_type\":\"Bearer\",\"user_id\":\"26FWFL\"}",
	));
	let client = client.with_redirect_uri(
		Url::parse("https://app.example.com/callback").expect("Redirect URI should parse."),
	);
	let session = client
		.authorize(Default::default())
		.expect("Authorization session should start successfully.");

	client.exchange_code(&session, "1234567890").await.expect("Exchange should succeed.");

	let requests = requests.lock();
	let params = form(requests[0].body());

	assert!(params.contains(&("grant_type".to_owned(), "authorization_code".to_owned())));
	assert!(params.contains(&("code".to_owned(), "1234567890".to_owned())));
	assert!(params.contains(&(
		"redirect_uri".to_owned(),
		"https://app.example.com/callback".to_owned()
	)));
	assert!(params.iter().any(|(key, value)| key == "code_verifier" && value.len() == 64));
}

#[tokio::test]
async fn resource_requests_carry_bearer_and_language() {
	let (client, requests, _) = build_client(FakeHttpClient::replying(
		StatusCode::OK,
		"{\"user\":{\"encodedId\":\"26FWFL\",\"displayName\":\"Jane\"}}",
	));
	let user = client
		.resource_owner(&AccessToken::new("eyJhbGciOi"))
		.await
		.expect("Profile fetch should succeed.");
	let requests = requests.lock();
	let request = &requests[0];

	assert_eq!(user.id(), Some("26FWFL"));
	assert_eq!(request.method(), Method::GET);
	assert_eq!(request.uri().to_string(), "https://api.fitbit.com/1/user/-/profile.json");
	assert_eq!(
		request.headers().get(AUTHORIZATION).map(HeaderValue::as_bytes),
		Some(&b"Bearer eyJhbGciOi"[..])
	);
	assert_eq!(
		request.headers().get(ACCEPT_LANGUAGE).map(HeaderValue::as_bytes),
		Some(&b"en_US"[..])
	);
}

#[tokio::test]
async fn transport_failures_reach_the_mapper_with_metadata() {
	let meta = ResponseMetadata { status: Some(503), retry_after: Some(Duration::seconds(5)) };
	let (client, _, mapper) = build_client(FakeHttpClient::offline(meta.clone()));
	let token = AccessToken::new("eyJhbGciOi").with_refresh_token("r-1");
	let errors = [
		client.resource_owner(&token).await.map(|_| ()),
		client.revoke(&token).await.map(|_| ()),
		client.refresh_token(&token).await.map(|_| ()),
	];

	for err in errors {
		match err {
			Err(Error::Transient(TransientError::UnexpectedResponse {
				status, retry_after, ..
			})) => {
				assert_eq!(status, Some(503));
				assert_eq!(retry_after, Some(Duration::seconds(5)));
			},
			other => panic!("Unexpected result: {other:?}."),
		}
	}

	assert_eq!(mapper.seen.lock().clone(), [
		(OperationKind::ResourceOwner, Some(meta.clone())),
		(OperationKind::Revoke, Some(meta.clone())),
		(OperationKind::RefreshToken, Some(meta)),
	]);
}
