//! Builds a Fitbit authorization URL from `FITBIT_*` environment variables and shows how the
//! redirect handler validates the returned state before exchanging the code.

// std
use std::collections::HashMap;
// crates.io
use color_eyre::Result;
// self
use oauth2_fitbit::{
	auth::ScopeSet,
	config::FitbitConfig,
	provider::AuthorizationOptions,
	url::Url,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let config = match FitbitConfig::from_env() {
		Ok(config) => config,
		Err(err) => {
			eprintln!("{err} Falling back to demo credentials.");

			FitbitConfig::new("22942C", "demo-secret")
				.with_redirect_uri(Url::parse("https://app.example.com/oauth/callback")?)
		},
	};
	let client = config.build_client()?;
	let session = client.authorize(
		AuthorizationOptions::default()
			.with_scopes(ScopeSet::new(["activity", "heartrate", "profile", "sleep"])?)
			.with_prompt("consent"),
	)?;

	println!("Send your user to {}.", &session.authorize_url);
	println!(
		"PKCE challenge ({:?}): {:?}.",
		session.code_challenge_method(),
		session.code_challenge()
	);

	let mut sessions = HashMap::new();

	sessions.insert(session.state.clone(), session.clone());

	// Simulate the redirect handler looking up the stored session by `state`.
	let returned_state = session.state.clone();

	if let Some(stashed) = sessions.remove(&returned_state) {
		stashed.validate_state(&returned_state)?;
		println!("Validated state for scopes `{}`.", stashed.scopes);
		println!("Call Client::exchange_code with this session and the `code` query parameter.");
	} else {
		eprintln!("State `{returned_state}` was not recognized.");
	}

	Ok(())
}
