//! Configuration error types
//!
//! Gameplay itself never fails: invariants are held by clamping and state
//! guards. Only loading and saving tuning/settings files can go wrong.

use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    Io(std::io::Error),
    /// The file is not valid JSON for the expected shape
    Parse(serde_json::Error),
    /// A value parsed but is outside its usable range
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config i/o failed: {err}"),
            Self::Parse(err) => write!(f, "config parse failed: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display() {
        let err = ConfigError::Invalid {
            field: "max_lives",
            reason: "must be at least 1",
        };
        assert_eq!(err.to_string(), "invalid config `max_lives`: must be at least 1");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_parse_error_converts() {
        let parsed: Result<u32, _> = serde_json::from_str("not json");
        let err: ConfigError = parsed.unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
