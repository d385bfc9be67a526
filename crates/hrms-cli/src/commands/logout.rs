//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ConnectionArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(conn: &ConnectionArgs, _args: LogoutArgs) -> Result<()> {
    let ctx = session::open(conn).await?;

    ctx.session.logout().await.context("Failed to logout")?;

    output::success("Logged out");
    Ok(())
}
