//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod notifications;
pub mod user;

use std::future::Future;
use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use socialapp_core::api::{ApiClient, ApiResult};
use socialapp_core::auth::FileCredentialStore;
use socialapp_core::config::Config;
use socialapp_core::core::gateway::{Gateway, SessionRestore};
use socialapp_core::core::interrupt;
use socialapp_core::core::ui::LogNavigator;
use tracing::debug;

/// Builds the gateway for one CLI invocation.
///
/// `--base-url` wins over `SOCIALAPP_BASE_URL`, which wins over config.
pub fn build_gateway(config: &Config, base_url: Option<&str>) -> Result<Gateway> {
    let api = match base_url {
        Some(url) => ApiClient::new(url, config.api.request_timeout()),
        None => ApiClient::from_config(&config.api),
    }
    .context("create API client")?;

    Ok(Gateway::new(
        api,
        Arc::new(FileCredentialStore::default()),
        Arc::new(LogNavigator),
    ))
}

/// Runs a gateway operation, cancelling it on Ctrl+C.
pub async fn cancellable<T>(
    gateway: &Gateway,
    operation: impl Future<Output = ApiResult<T>>,
) -> Result<T> {
    tokio::pin!(operation);
    tokio::select! {
        result = &mut operation => Ok(result?),
        () = interrupt::wait_for_interrupt() => {
            debug!("interrupted, cancelling in-flight requests");
            gateway.cancel_in_flight();
            // Let the operation observe the cancellation and reset its loading flags.
            let _ = operation.await;
            Err(interrupt::InterruptedError.into())
        }
    }
}

/// Restores the persisted session or fails with a hint to log in.
pub async fn require_session(gateway: &Gateway) -> Result<()> {
    match cancellable(gateway, gateway.restore_session())
        .await
        .context("load user data")?
    {
        SessionRestore::Restored => Ok(()),
        SessionRestore::NoToken => {
            anyhow::bail!("Not logged in. Run 'socialapp login' first.")
        }
        SessionRestore::Expired => {
            anyhow::bail!("Session expired. Run 'socialapp login' again.")
        }
    }
}

/// Reads a secret from the flag or, when absent, one line of stdin.
pub fn read_secret(value: Option<String>, prompt: &str) -> Result<String> {
    let secret = if let Some(value) = value {
        value
    } else {
        eprint!("{prompt}: ");
        std::io::stderr().flush().ok();
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        line.trim_end_matches(['\r', '\n']).to_string()
    };

    if secret.is_empty() {
        anyhow::bail!("{prompt} cannot be empty");
    }
    Ok(secret)
}
