//! Subcommand implementations.

pub mod list;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod request;
pub mod status;

/// Parse a `key=value` query parameter.
pub(crate) fn parse_query(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty query key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_query_pairs() {
        assert_eq!(
            parse_query("status=pending").unwrap(),
            ("status".to_string(), "pending".to_string())
        );
        assert_eq!(
            parse_query("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_query("empty=").unwrap().1, "");
        assert!(parse_query("novalue").is_err());
        assert!(parse_query("=x").is_err());
    }
}
