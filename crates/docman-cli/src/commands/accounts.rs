//! Account commands: signup, login, logout, whoami.

use anyhow::{Context, Result};
use clap::Args;

use docman_api::dto::request::{LoginRequest, SignupBody};
use docman_api::dto::response::{SignupResponse, TokenResponse, UserResponse};

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};

/// Arguments for the signup command
#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Login email
    #[arg(short, long)]
    pub email: String,

    /// Display name
    #[arg(short, long)]
    pub name: String,

    /// Password (prompted with confirmation when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email
    #[arg(short, long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Create an account.
pub async fn signup(args: &SignupArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match.")
            .interact()
            .context("Failed to read password")?,
    };

    let body = SignupBody {
        email: args.email.clone(),
        name: args.name.clone(),
        password_confirm: password.clone(),
        password,
    };
    let created: SignupResponse = client.post_json("/api/accounts/signup/", &body).await?;

    match format {
        OutputFormat::Json => output::print_json(&created),
        OutputFormat::Table => {
            output::print_success(&format!("Account created for {}", created.email));
            output::print_kv("User ID", &created.id.to_string());
        }
    }
    Ok(())
}

/// Log in and print the session token.
pub async fn login(args: &LoginArgs, client: &ApiClient, format: OutputFormat) -> Result<()> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt(format!("Password for {}", args.email))
            .interact()
            .context("Failed to read password")?,
    };

    let body = LoginRequest {
        email: args.email.clone(),
        password,
    };
    let token: TokenResponse = client.post_json("/api/accounts/login/", &body).await?;

    match format {
        OutputFormat::Json => output::print_json(&token),
        OutputFormat::Table => {
            output::print_success("Logged in.");
            println!("export DOCMAN_TOKEN={}", token.token);
        }
    }
    Ok(())
}

/// Revoke the current session.
pub async fn logout(client: &ApiClient) -> Result<()> {
    client.require_token()?;
    client.post_empty("/api/accounts/logout/").await?;
    output::print_success("Session revoked.");
    Ok(())
}

/// Show the current account.
pub async fn whoami(client: &ApiClient, format: OutputFormat) -> Result<()> {
    client.require_token()?;
    let me: UserResponse = client.get_json("/api/accounts/me/").await?;

    match format {
        OutputFormat::Json => output::print_json(&me),
        OutputFormat::Table => {
            output::print_kv("ID", &me.id.to_string());
            output::print_kv("Email", &me.email);
            output::print_kv("Name", &me.name);
            output::print_kv("Role", &me.role.to_string());
        }
    }
    Ok(())
}
