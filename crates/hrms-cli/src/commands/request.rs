//! Generic request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use hrms_core::{ApiRequest, Method};

use super::parse_query;
use crate::cli::ConnectionArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the API base URL
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long, value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(conn: &ConnectionArgs, args: RequestArgs) -> Result<()> {
    let ctx = session::open(conn).await?;

    let mut request = ApiRequest::new(args.method, &args.path);
    for (key, value) in args.query {
        request = request.query(key, value);
    }
    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.with_body(body);
    }

    let response = ctx
        .session
        .send(request)
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;

    output::response(&response, args.pretty)
}
