//! Runs a complete login offline against the in-process provider simulator, then passes the
//! issued session through the gate.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth1_gatekeeper::{
	auth::MemberId,
	flows::Gatekeeper,
	provider::MemoryIdentityProvider,
	session::SessionTokenService,
	store::MemoryStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let provider =
		Arc::new(MemoryIdentityProvider::new(Url::parse("https://provider.example.com/authorize")?));
	let gatekeeper = Gatekeeper::new(
		provider.clone(),
		Arc::new(MemoryStore::default()),
		SessionTokenService::new("demo-session-secret-change-me"),
		Url::parse("http://localhost:8080/auth/callback")?,
	);
	let authorize_url = gatekeeper.begin_login().await?;

	println!("Send your user to {authorize_url}.");

	let request_token = authorize_url
		.query_pairs()
		.find(|(k, _)| k == "oauth_token")
		.map(|(_, v)| v.into_owned())
		.ok_or_else(|| eyre!("Authorize URL is missing oauth_token."))?;
	// The provider would redirect back with this verifier once the user approves.
	let verifier = provider
		.authorize(&request_token, MemberId::new("demo-member")?)
		.ok_or_else(|| eyre!("Request token `{request_token}` was not issued."))?;
	let outcome = gatekeeper.complete_login(&request_token, &verifier).await?;

	println!(
		"Member {} logged in; session expires at {}.",
		outcome.member.id, outcome.session.expires_at
	);

	let member = gatekeeper.authenticate(Some(&format!("Bearer {}", outcome.session.token))).await?;

	println!("Gate resolved member {}.", member.id);

	match gatekeeper.complete_login(&request_token, &verifier).await {
		Ok(_) => eprintln!("Replayed callback was unexpectedly accepted."),
		Err(e) => println!("Replayed callback rejected: {e}"),
	}

	Ok(())
}
