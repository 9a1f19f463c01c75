//! Token probe
//!
//! Builds an AppState provider from the environment and fetches one room
//! token through the configured auth strategy. Useful for checking a token
//! endpoint deployment without a browser.
//!
//! Firebase mode needs an in-browser identity provider and is not supported
//! here.

use anyhow::{bail, Context};
use app_state::auth::Collaborators;
use app_state::{AppStateProvider, AuthMode, Config};
use common::secret::{ExposeSecret, SecretString};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PROBE_IDENTITY: &str = "probe";
const DEFAULT_PROBE_ROOM: &str = "probe-room";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app_state=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    info!(
        auth_mode = %config.auth_mode,
        token_url = %config.token_url(),
        "Configuration loaded successfully"
    );

    if config.auth_mode == AuthMode::Firebase {
        bail!("the token probe does not support firebase auth");
    }

    let identity =
        std::env::var("PROBE_IDENTITY").unwrap_or_else(|_| DEFAULT_PROBE_IDENTITY.to_string());
    let room = std::env::var("PROBE_ROOM").unwrap_or_else(|_| DEFAULT_PROBE_ROOM.to_string());

    let provider = AppStateProvider::new(&config, &Collaborators::default())?;
    let state = provider.state();

    state.initialize_auth().await;
    if config.auth_mode == AuthMode::Passcode && state.user().is_none() {
        bail!("PASSCODE is missing or was not accepted");
    }

    let token: SecretString = match provider
        .scope(async { state.get_token(&identity, &room).await })
        .await
    {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Token fetch failed");
            return Err(e.into());
        }
    };

    info!(
        identity = %identity,
        room = %room,
        token_len = token.expose_secret().len(),
        "Token fetched"
    );

    Ok(())
}
