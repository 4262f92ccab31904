//! Domain error types.

/// Raised by strategy constructors for bad parameter values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("invalid parameter {key} = {value}: {reason}")]
    InvalidParam {
        key: String,
        value: f64,
        reason: String,
    },

    #[error("strategy {name} failed to construct: {reason}")]
    Construction { name: String, reason: String },
}

impl StrategyError {
    pub fn invalid(key: &str, value: f64, reason: &str) -> Self {
        StrategyError::InvalidParam {
            key: key.to_string(),
            value,
            reason: reason.to_string(),
        }
    }
}

/// Top-level error type for stockscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error for {code}: {reason}")]
    Data { code: String, reason: String },

    #[error("no data available in {location}")]
    NoData { location: String },

    #[error("no strategies loaded")]
    NoStrategies,

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. }
            | ScreenerError::ConfigMissing { .. }
            | ScreenerError::ConfigInvalid { .. }
            | ScreenerError::Strategy(_)
            | ScreenerError::NoStrategies => 2,
            ScreenerError::Data { .. } => 3,
            ScreenerError::NoData { .. } => 5,
            ScreenerError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_param_message() {
        let err = StrategyError::invalid("M", 0.0, "must be at least 1");
        assert_eq!(err.to_string(), "invalid parameter M = 0: must be at least 1");
    }

    #[test]
    fn strategy_error_converts_into_screener_error() {
        let err: ScreenerError = StrategyError::invalid("N", -1.0, "must be positive").into();
        assert!(matches!(err, ScreenerError::Strategy(_)));
    }

    #[test]
    fn config_missing_message() {
        let err = ScreenerError::ConfigMissing {
            section: "screen".into(),
            key: "data_dir".into(),
        };
        assert_eq!(err.to_string(), "missing config key [screen] data_dir");
    }
}
