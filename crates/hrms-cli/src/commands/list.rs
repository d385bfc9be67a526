//! List command implementation.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde_json::Value;

use hrms_core::ApiRequest;

use super::parse_query;
use crate::cli::ConnectionArgs;
use crate::output;
use crate::session;

/// Backend collections reachable with `hrms list`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Employees,
    Attendance,
    Leaves,
    Overtime,
    Payroll,
    Departments,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Employees => "/employees",
            Resource::Attendance => "/attendance",
            Resource::Leaves => "/leaves",
            Resource::Overtime => "/overtime",
            Resource::Payroll => "/payroll",
            Resource::Departments => "/departments",
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Collection to list
    pub resource: Resource,

    /// Query parameter as key=value (repeatable)
    #[arg(long, value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(conn: &ConnectionArgs, args: ListArgs) -> Result<()> {
    let ctx = session::open(conn).await?;

    let mut request = ApiRequest::get(args.resource.path());
    for (key, value) in args.query {
        request = request.query(key, value);
    }

    let response = ctx
        .session
        .send(request)
        .await
        .with_context(|| format!("Failed to list {}", args.resource.path()))?;

    // Collections come back either bare or wrapped in `data`.
    let body: Value = response.json().context("Unexpected response body")?;
    let items = match &body {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        _ => None,
    };

    let Some(items) = items else {
        return if args.pretty {
            output::json_pretty(&body)
        } else {
            output::json(&body)
        };
    };

    if items.is_empty() {
        eprintln!("{}", "No records found.".dimmed());
        return Ok(());
    }

    for item in items {
        if args.pretty {
            output::json_pretty(item)?;
        } else {
            output::json(item)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_map_to_collection_paths() {
        assert_eq!(Resource::Employees.path(), "/employees");
        assert_eq!(Resource::Payroll.path(), "/payroll");
        assert_eq!(
            Resource::from_str("departments", true).unwrap(),
            Resource::Departments
        );
    }
}
