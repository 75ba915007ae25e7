//! Parsing of the optimizer's stdout.

use crate::error::GatewayError;
use serde_json::Value;

/// Parse optimizer output as exactly one JSON value. Key order is preserved,
/// so re-serializing reproduces compact input byte for byte.
pub fn parse_result(stdout: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(stdout.trim()).map_err(GatewayError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_round_trips_verbatim() {
        let raw = r#"{"status":"ok","banks":[5,10]}"#;
        let value = parse_result(raw).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), raw);
    }

    #[test]
    fn malformed_and_empty_output_fail() {
        assert!(matches!(parse_result("{"), Err(GatewayError::Parse(_))));
        assert!(matches!(parse_result(""), Err(GatewayError::Parse(_))));
        assert!(matches!(parse_result("   \n"), Err(GatewayError::Parse(_))));
    }

    #[test]
    fn trailing_data_fails() {
        assert!(parse_result(r#"{"a":1}{"b":2}"#).is_err());
        assert!(parse_result("{\"a\":1}\nDone.").is_err());
    }
}
