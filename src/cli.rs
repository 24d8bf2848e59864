// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line interface: argument parsing and command dispatch.

use crate::config::Config;
use crate::lifecycle::TripAction;
use crate::models::{NewTrip, TripFilter, UserRole};
use crate::render;
use crate::services::{
    ApiClient, AuthService, FileTokenStore, Landing, SharedTokenStore, TokenClaims, TokenStore,
    TripService,
};
use crate::time_utils::{describe_remaining, format_utc_rfc3339};
use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "transport-match")]
#[command(version, about = "Find and manage Transport Match trips")]
#[command(
    after_help = "Environment:\n  TM_API_BASE_URL   API location (default http://localhost:8000)\n  TM_TIMEOUT_SECS   Request timeout in seconds (default 45)\n  TM_TOKEN_PATH     Where the session token is kept\n  RUST_LOG          Log filter"
)]
pub struct Cli {
    /// Override TM_API_BASE_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Print JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TM_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_parser = parse_role)]
        role: UserRole,
    },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Check that the API is reachable
    Health,
    /// Browse and manage trips
    Trips {
        #[command(subcommand)]
        command: TripsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TripsCommand {
    /// List open trips
    List {
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        destination: Option<String>,
        /// Exact date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
    },
    /// Trips you posted (company) or reserved (driver)
    Mine,
    /// Show one trip and the actions available to you
    Show { id: i64 },
    /// Post a new trip (companies only)
    Create {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Pickup window, e.g. 08-12
        #[arg(long)]
        time_window: Option<String>,
        /// Compensation in SEK
        #[arg(long)]
        compensation: f64,
        #[arg(long)]
        vehicle: Option<String>,
    },
    /// Reserve an open trip (drivers only)
    Reserve { id: i64 },
    /// Release your reservation
    Unreserve { id: i64 },
    /// Mark your reserved trip as completed
    Complete { id: i64 },
    /// Cancel your open or reserved trip
    Cancel { id: i64 },
}

fn parse_role(value: &str) -> Result<UserRole, String> {
    value.parse()
}

/// Writes either JSON or text for each result.
struct Output<'a, W: Write> {
    out: &'a mut W,
    json: bool,
}

impl<W: Write> Output<'_, W> {
    fn emit<T: Serialize>(
        &mut self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *self.out, value)?;
            writeln!(self.out)?;
        } else {
            write!(self.out, "{}", text())?;
        }
        Ok(())
    }
}

/// Run a parsed command against the API, writing results to `out`.
pub async fn run<W: Write>(cli: Cli, config: Config, out: &mut W) -> anyhow::Result<()> {
    let config = match &cli.api_url {
        Some(url) => config.with_api_base_url(url)?,
        None => config,
    };
    let tokens: SharedTokenStore = Arc::new(FileTokenStore::new(&config.token_path));
    let api = ApiClient::from_config(&config, tokens.clone())?;
    tracing::debug!(base_url = %api.base_url(), "Using API");

    run_with(cli.command, api, cli.json, out).await
}

/// Dispatch with an already-built client.
pub async fn run_with<W: Write>(
    command: Command,
    api: ApiClient,
    json: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let auth = AuthService::new(api.clone());
    let trips = TripService::new(api.clone());
    let mut output = Output { out, json };

    match command {
        Command::Signup {
            name,
            email,
            password,
            role,
        } => {
            let user = auth.signup(&name, &email, &password, role).await?;
            output.emit(&user, || {
                format!(
                    "Welcome, {}.\nNext: {}\n",
                    render::user_line(&user),
                    Landing::for_role(user.role).hint()
                )
            })?;
        }
        Command::Login { email, password } => {
            let user = auth.login(&email, &password).await?;
            output.emit(&user, || {
                format!(
                    "Logged in as {}.\nNext: {}\n",
                    render::user_line(&user),
                    Landing::for_role(user.role).hint()
                )
            })?;
        }
        Command::Logout => {
            auth.logout()?;
            output.emit(&serde_json::json!({ "logged_out": true }), || {
                "Logged out.\n".to_string()
            })?;
        }
        Command::Whoami => {
            let user = auth.restore().await?.ok_or(crate::error::ClientError::NotLoggedIn)?;
            let expires_at = api
                .tokens()
                .load()?
                .and_then(|t| TokenClaims::inspect(&t))
                .and_then(|c| c.expires_at());
            let value = serde_json::json!({
                "user": &user,
                "session_expires_at": expires_at.map(format_utc_rfc3339),
            });
            output.emit(&value, || {
                let mut text = format!("{}\n", render::user_line(&user));
                if let Some(exp) = expires_at {
                    text.push_str(&format!(
                        "Session expires {} ({})\n",
                        format_utc_rfc3339(exp),
                        describe_remaining(chrono::Utc::now(), exp)
                    ));
                }
                text
            })?;
        }
        Command::Health => {
            let health = api
                .health()
                .await
                .with_context(|| format!("checking {}/health", api.base_url()))?;
            output.emit(&serde_json::json!({ "ok": health.ok }), || {
                format!(
                    "{} is {}\n",
                    api.base_url(),
                    if health.ok { "up" } else { "unhealthy" }
                )
            })?;
        }
        Command::Trips { command } => {
            match command {
                TripsCommand::List {
                    origin,
                    destination,
                    date,
                } => {
                    let filter = TripFilter {
                        origin,
                        destination,
                        date,
                    };
                    let list = trips.explore(&filter).await?;
                    output.emit(&list, || {
                        let empty = if filter.is_empty() {
                            "No open trips right now."
                        } else {
                            "No open trips match the search."
                        };
                        render::trip_list(&list, empty)
                    })?;
                }
                TripsCommand::Mine => {
                    let list = trips.mine().await?;
                    output.emit(&list, || {
                        render::trip_list(
                            &list,
                            "No trips yet. Companies: create one. Drivers: reserve one from the list.",
                        )
                    })?;
                }
                TripsCommand::Show { id } => {
                    let view = trips.detail(id).await?;
                    output.emit(&view, || render::trip_view(&view))?;
                }
                TripsCommand::Create {
                    origin,
                    destination,
                    date,
                    time_window,
                    compensation,
                    vehicle,
                } => {
                    let created = trips
                        .create(NewTrip {
                            origin,
                            destination,
                            date,
                            time_window,
                            compensation_sek: compensation,
                            vehicle_info: vehicle,
                        })
                        .await?;
                    output.emit(&created, || {
                        format!("Trip created.\n\n{}", render::trip_card(&created))
                    })?;
                }
                TripsCommand::Reserve { id } => {
                    perform(&trips, &mut output, TripAction::Reserve, id).await?
                }
                TripsCommand::Unreserve { id } => {
                    perform(&trips, &mut output, TripAction::Unreserve, id).await?
                }
                TripsCommand::Complete { id } => {
                    perform(&trips, &mut output, TripAction::Complete, id).await?
                }
                TripsCommand::Cancel { id } => {
                    perform(&trips, &mut output, TripAction::Cancel, id).await?
                }
            }
        }
    }

    Ok(())
}

async fn perform<W: Write>(
    trips: &TripService,
    output: &mut Output<'_, W>,
    action: TripAction,
    id: i64,
) -> anyhow::Result<()> {
    match trips.perform(action, id).await {
        Ok(outcome) => output.emit(&outcome, || {
            format!(
                "Done: {} #{}\n\n{}",
                outcome.action,
                id,
                render::trip_view(&outcome.view)
            )
        }),
        Err(e) => {
            if let Some(view) = e.refreshed() {
                output.emit(view, || {
                    format!("Trip #{id} now:\n\n{}", render::trip_view(view))
                })?;
            }
            Err(e.into())
        }
    }
}
