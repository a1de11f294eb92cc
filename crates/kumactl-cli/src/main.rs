mod auth;
mod cli;
mod commands;
mod config;
mod observability;
mod output;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use kumactl_core::{Credentials, Outcome};

use cli::{Cli, Commands, MonitorCommands, OutputFormat};
use commands::RunContext;
use output::{print_error, print_result};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(outcome) => ExitCode::from(exit_code(outcome)),
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::from(exit_code(Outcome::Failed))
        }
    }
}

/// `0` nothing to do, `2` changes applied, `1` failed.
fn exit_code(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Unchanged => 0,
        Outcome::Failed => 1,
        Outcome::Changed => 2,
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let profile = cli.profile.clone();
    let profile_config = config::load_profile(&profile)?;
    let stored = auth::load_credentials(&profile)?;

    let format = match (cli.format, profile_config.format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(name)) => OutputFormat::parse(name).unwrap_or_default(),
        (None, None) => OutputFormat::default(),
    };
    let ctx = RunContext {
        url: config::resolve_url(
            &cli.url,
            &profile_config,
            stored.as_ref().map(|creds| creds.url.as_str()),
        ),
        profile: profile.clone(),
        format,
        reply_timeout: Duration::from_secs(cli.timeout),
    };
    let username = cli.username.as_deref().or(profile_config.username.as_deref());
    let credentials = || -> Result<Credentials> {
        auth::resolve_credentials(
            cli.token.as_deref(),
            username,
            cli.password.as_deref(),
            stored.as_ref(),
        )
    };

    let result = match &cli.command {
        Commands::Tag(args) => commands::reconcile::tag(&ctx, &credentials()?, args).await,
        Commands::MonitorTag(args) => {
            commands::reconcile::monitor_tag(&ctx, &credentials()?, args).await
        }
        Commands::Setup => {
            commands::setup::setup(&ctx, username, cli.password.as_deref()).await?
        }
        Commands::Monitor(args) => {
            match &args.command {
                MonitorCommands::List(list) => {
                    commands::monitor::list(&ctx, &credentials()?, list).await?
                }
            }
            return Ok(Outcome::Unchanged);
        }
        Commands::Login => {
            commands::auth::login(&ctx, username, cli.password.as_deref()).await?;
            return Ok(Outcome::Unchanged);
        }
        Commands::Logout => {
            commands::auth::logout(&profile)?;
            return Ok(Outcome::Unchanged);
        }
        Commands::Whoami => {
            commands::auth::whoami(&profile)?;
            return Ok(Outcome::Unchanged);
        }
        Commands::Config(args) => {
            match &args.command {
                cli::ConfigCommands::Show => {
                    println!("{}: {}", "Profile".cyan(), profile);
                    println!("{}: {}", "URL".cyan(), ctx.url);
                    println!(
                        "{}: {}",
                        "Username".cyan(),
                        profile_config.username.as_deref().unwrap_or("(not set)")
                    );
                    println!(
                        "{}: {}",
                        "Format".cyan(),
                        profile_config.format.as_deref().unwrap_or("json")
                    );
                }
                cli::ConfigCommands::Set(set_args) => {
                    let mut updated = profile_config.clone();
                    config::set_key(&mut updated, &set_args.key, &set_args.value)?;
                    config::save_profile(&profile, &updated)?;
                    output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
                }
            }
            return Ok(Outcome::Unchanged);
        }
    };

    print_result(&result, ctx.format)?;
    if let Some(error) = &result.error {
        print_error(&error.to_string());
    }
    Ok(result.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(Outcome::Unchanged), 0);
        assert_eq!(exit_code(Outcome::Changed), 2);
        assert_eq!(exit_code(Outcome::Failed), 1);
    }
}
