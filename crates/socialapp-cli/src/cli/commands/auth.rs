//! Login, signup and logout handlers.

use anyhow::{Context, Result};
use socialapp_core::api::{LoginRequest, SignupRequest};
use socialapp_core::auth::{self, FileCredentialStore};
use socialapp_core::core::gateway::Gateway;

use super::{cancellable, read_secret};

pub async fn login(gateway: &Gateway, email: String, password: Option<String>) -> Result<()> {
    let password = read_secret(password, "Password")?;
    cancellable(gateway, gateway.login_user(LoginRequest { email, password }))
        .await
        .context("Login failed")?;
    print_logged_in(gateway, "Logged in");
    Ok(())
}

pub async fn signup(
    gateway: &Gateway,
    email: String,
    handle: String,
    password: Option<String>,
    confirm_password: Option<String>,
) -> Result<()> {
    let password = read_secret(password, "Password")?;
    let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
    let request = SignupRequest {
        email,
        password,
        confirm_password,
        handle,
    };
    cancellable(gateway, gateway.signup_user(request))
        .await
        .context("Signup failed")?;
    print_logged_in(gateway, "Signed up");
    Ok(())
}

fn print_logged_in(gateway: &Gateway, verb: &str) {
    match gateway.session().credentials().handle {
        Some(handle) => println!("{verb} as {handle}."),
        None => println!("{verb}."),
    }
}

pub fn logout(gateway: &Gateway) -> Result<()> {
    let store = FileCredentialStore::default();
    let stored = auth::stored_authorization(&store).context("read stored token")?;
    if stored.is_none() {
        println!("Not logged in.");
        return Ok(());
    }

    gateway.logout_user();
    println!("Logged out.");
    Ok(())
}
