//! Fetches the profile behind `FITBIT_ACCESS_TOKEN`, prints the rate-limit budget, and revokes
//! the token.

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oauth2_fitbit::{
	auth::AccessToken,
	config::FitbitConfig,
	oauth::oauth2::http::Method,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let client = FitbitConfig::from_env()?.build_client()?;
	let token = AccessToken::new(
		env::var("FITBIT_ACCESS_TOKEN").map_err(|_| eyre!("FITBIT_ACCESS_TOKEN is not set."))?,
	);
	let user = client.resource_owner(&token).await?;

	println!(
		"Signed in as {} ({}).",
		user.display_name().unwrap_or("unknown"),
		user.id().unwrap_or("unknown")
	);

	let devices = Url::parse("https://api.fitbit.com/1/user/-/devices.json")?;
	let response = client.authenticated_request(Method::GET, &devices, &token).await?;
	let rate_limit = client.provider.rate_limit(&response);

	println!(
		"Devices request returned {}; {} of {} calls left, window resets in {}s.",
		response.status(),
		rate_limit.remaining().unwrap_or("?"),
		rate_limit.limit().unwrap_or("?"),
		rate_limit.reset().unwrap_or("?")
	);

	let response = client.revoke(&token).await?;

	println!("Revoke returned {}.", response.status());

	Ok(())
}
