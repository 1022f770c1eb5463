//! Validation of queue and workload parameters
//!
//! Shared by the clap value parsers and the configuration file loader, so a
//! bad value is rejected the same way wherever it comes from.

use std::time::Duration;

/// A rejected parameter value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A queue needs room for at least two events so "half full" is meaningful
pub fn validate_capacity(capacity: usize) -> Result<usize, ValidationError> {
    if capacity < 2 {
        return Err(ValidationError::new(&format!(
            "Queue capacity must be at least 2, got {}",
            capacity
        )));
    }
    Ok(capacity)
}

/// Reject zero-length intervals and timeouts
pub fn validate_duration(name: &str, value: Duration) -> Result<Duration, ValidationError> {
    if value.is_zero() {
        return Err(ValidationError::new(&format!(
            "{} must be greater than 0",
            name
        )));
    }
    Ok(value)
}

/// Validate positive integer value
pub fn validate_positive_int(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

/// clap value parser for `--capacity`
pub fn parse_capacity(value: &str) -> Result<usize, String> {
    let capacity = value
        .parse::<usize>()
        .map_err(|_| format!("'{}' is not a valid queue capacity", value))?;
    validate_capacity(capacity).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_below_two_rejected() {
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(1).is_err());
        assert_eq!(validate_capacity(2), Ok(2));

        let err = validate_capacity(1).unwrap_err();
        assert!(err.message().contains("at least 2"));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let err = validate_duration("flush_interval_ms", Duration::ZERO).unwrap_err();
        assert_eq!(err.to_string(), "flush_interval_ms must be greater than 0");
        assert!(validate_duration("flush_timeout_secs", Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_validate_positive_int() {
        assert_eq!(validate_positive_int("8"), Ok(8));
        assert!(validate_positive_int("0").is_err());
        assert!(validate_positive_int("-3").is_err());
        assert!(validate_positive_int("many").is_err());
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity("1024"), Ok(1024));
        assert!(parse_capacity("1").unwrap_err().contains("at least 2"));
        assert!(parse_capacity("lots").is_err());
    }
}
