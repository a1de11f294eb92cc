use anyhow::{Context, Result};
use colored::Colorize;
use kumactl_core::{with_session, Credentials};

use super::RunContext;
use crate::auth::{self, StoredCredentials};
use crate::output::print_success;

/// Logs in with a password and stores the issued token for the profile.
pub async fn login(ctx: &RunContext, username: Option<&str>, password: Option<&str>) -> Result<()> {
    let username = username.context("--username is required")?;
    let password = password.context("--password is required")?;

    let client = ctx.connect().await?;
    let credentials = Credentials::password(username, password);
    let token = with_session(client, async |session| session.authenticate(&credentials).await)
        .await?
        .context("server did not issue a token")?;

    let creds = StoredCredentials {
        url: ctx.url.clone(),
        username: Some(username.to_string()),
        token,
    };
    auth::save_credentials(&ctx.profile, &creds)?;
    print_success(&format!(
        "Logged in to {} (user: {})",
        ctx.url.cyan(),
        username.cyan()
    ));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if auth::remove_credentials(profile)? {
        print_success("Logged out (token removed)");
    } else {
        println!("No credentials found for profile \"{profile}\"");
    }
    Ok(())
}

pub fn whoami(profile: &str) -> Result<()> {
    match auth::load_credentials(profile)? {
        Some(creds) => {
            println!("{}: {}", "Profile".cyan(), profile);
            println!("{}: {}", "URL".cyan(), creds.url.cyan());
            println!(
                "{}: {}",
                "User".cyan(),
                creds.username.as_deref().unwrap_or("(unknown)")
            );
        }
        None => println!("Not logged in (profile \"{profile}\")"),
    }
    Ok(())
}
