//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{list, login, logout, refresh_token, request, status};

/// Command-line client for the HRMS backend API.
#[derive(Parser, Debug)]
#[command(name = "hrms")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the backend lives and where credentials are kept.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// HRMS API base URL
    #[arg(long, env = "HRMS_API_URL")]
    pub api_url: String,

    /// Where to keep credentials
    #[arg(long, value_enum, env = "HRMS_CREDENTIAL_STORE", default_value_t = StoreKind::File)]
    pub store: StoreKind,

    /// Credentials file for the file store, and where the cookie store
    /// saves its jar between commands
    #[arg(long, env = "HRMS_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "HRMS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Credential store backends.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Held in memory for a single command; nothing carries over to the next
    Memory,
    /// Persisted in a JSON file
    File,
    /// Refresh token kept in an HTTP cookie jar, saved to the credentials file
    Cookie,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session tokens
    Login(login::LoginArgs),

    /// Log out and clear stored tokens
    Logout(logout::LogoutArgs),

    /// Show the session state
    Status(status::StatusArgs),

    /// Exchange the refresh token for a new access token
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Send an arbitrary request to the API
    Request(request::RequestArgs),

    /// List a backend collection
    List(list::ListArgs),
}
