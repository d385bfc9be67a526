//! Status command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hrms_core::SessionState;

use crate::cli::ConnectionArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(conn: &ConnectionArgs, _args: StatusArgs) -> Result<()> {
    let ctx = session::open(conn).await?;

    let state = ctx
        .session
        .restore()
        .await
        .context("Failed to read session state")?;

    let label = state.to_string();
    let label = match state {
        SessionState::Authenticated => label.green(),
        SessionState::Recoverable => label.yellow(),
        SessionState::Unauthenticated => label.red(),
    };

    output::field("API", ctx.session.config().api_url.as_str());
    output::field("Store", &ctx.store.describe());
    output::field("State", &label.to_string());
    if let Some(saved_at) = ctx.store.saved_at()? {
        output::field("Saved at", &saved_at);
    }

    Ok(())
}
