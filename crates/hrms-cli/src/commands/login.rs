//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hrms_core::Credentials;

use crate::cli::{ConnectionArgs, StoreKind};
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(conn: &ConnectionArgs, args: LoginArgs) -> Result<()> {
    let ctx = session::open(conn).await?;
    // A 401 from here means bad credentials, not an expired session.
    ctx.navigator.enter_login();

    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    ctx.session
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", credentials.email());
    output::field("API", ctx.session.config().api_url.as_str());
    output::field("Store", &ctx.store.describe());
    if conn.store == StoreKind::Memory {
        output::warning("memory store: this session ends when the command exits");
    }

    Ok(())
}
