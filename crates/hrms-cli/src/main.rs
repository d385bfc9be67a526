//! hrms - Command-line client for the HRMS backend.
//!
//! A thin wrapper over `hrms-http`: every request goes through the
//! authenticated session, so an expired access token is refreshed and the
//! request replayed without the user noticing.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{list, login, logout, refresh_token, request, status};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let conn = cli.connection;
    match cli.command {
        Commands::Login(args) => login::run(&conn, args).await,
        Commands::Logout(args) => logout::run(&conn, args).await,
        Commands::Status(args) => status::run(&conn, args).await,
        Commands::RefreshToken(args) => refresh_token::run(&conn, args).await,
        Commands::Request(args) => request::run(&conn, args).await,
        Commands::List(args) => list::run(&conn, args).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output stays pipeable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
