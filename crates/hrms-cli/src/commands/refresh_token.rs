//! Refresh token command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use hrms_core::SessionState;

use crate::cli::ConnectionArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(conn: &ConnectionArgs, _args: RefreshTokenArgs) -> Result<()> {
    let ctx = session::open(conn).await?;

    if ctx.session.state().await? == SessionState::Unauthenticated {
        bail!("No active session. Run 'hrms login' first.");
    }

    eprintln!("{}", "Refreshing session...".dimmed());

    ctx.session
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("Store", &ctx.store.describe());

    Ok(())
}
