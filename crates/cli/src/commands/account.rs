//! Sign-in, registration and checkout commands.

use secrecy::SecretString;

use bazaar_storefront::models::{Credentials, Registration};
use bazaar_storefront::state::AppState;

use crate::{CliError, output};

pub async fn login(state: &AppState, username: String, password: String) -> Result<(), CliError> {
    let user = state.login(&Credentials::new(username, password)).await?;
    output::line(&format!("Signed in as {}.", user.username));
    Ok(())
}

pub fn logout(state: &AppState) -> Result<(), CliError> {
    state.logout()?;
    output::line("Signed out.");
    Ok(())
}

pub fn whoami(state: &AppState) {
    output::user(state.auth().user().as_ref());
}

pub fn register(
    state: &AppState,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<(), CliError> {
    let registration = Registration {
        username,
        email,
        password: SecretString::from(password),
        confirm_password: SecretString::from(confirm_password),
    };
    state.register(&registration)?;
    output::line("Registration accepted. Sign in with `bazaar login`.");
    Ok(())
}

pub fn checkout(state: &AppState) -> Result<(), CliError> {
    let summary = state.checkout_summary()?;
    output::checkout(&summary.user, &summary.lines, summary.total, summary.item_count);
    Ok(())
}
