//! Serves the login flow over HTTP using the Trello preset.
//!
//! Reads a JSON config from the path in `GATEKEEPER_CONFIG` (default `gatekeeper.json`) and
//! listens on the configured base URL's port.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::Result;
use tracing_subscriber::EnvFilter;
// self
use oauth1_gatekeeper::{config::GatekeeperConfig, flows::Gatekeeper, web};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.init();

	let path = env::var("GATEKEEPER_CONFIG").unwrap_or_else(|_| "gatekeeper.json".into());
	let config = GatekeeperConfig::from_path(&path)?;
	let port = config.callback_url()?.port_or_known_default().unwrap_or(8080);
	let gatekeeper = Arc::new(Gatekeeper::from_config(&config)?);
	let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

	tracing::info!(%port, callback = %gatekeeper.callback(), "Gatekeeper listening.");

	axum::serve(listener, web::router(gatekeeper)).await?;

	Ok(())
}
