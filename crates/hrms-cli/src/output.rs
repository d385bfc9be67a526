//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use hrms_core::ApiResponse;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a response body: JSON when it parses, raw text otherwise.
pub fn response(response: &ApiResponse, pretty: bool) -> Result<()> {
    if response.is_empty() {
        eprintln!("{}", format!("HTTP {} (empty body)", response.status()).dimmed());
        return Ok(());
    }

    match response.json::<serde_json::Value>() {
        Ok(value) if pretty => json_pretty(&value),
        Ok(value) => json(&value),
        Err(_) => {
            println!("{}", response.text());
            Ok(())
        }
    }
}
