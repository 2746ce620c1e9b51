//! Domain error types.

/// Top-level error type for tast.
#[derive(Debug, thiserror::Error)]
pub enum TastError {
    #[error("format error in {source_name} line {line}: {reason}")]
    Format {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("invalid period {0}: must be at least 1")]
    InvalidPeriod(usize),

    #[error("incomplete result for {code} period {period}: {reason}")]
    IncompleteResult {
        code: String,
        period: usize,
        reason: String,
    },

    #[error("no daily history for {code}")]
    NoData { code: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TastError {
    pub fn format(source_name: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        TastError::Format {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }
}

impl From<&TastError> for std::process::ExitCode {
    fn from(err: &TastError) -> Self {
        let code: u8 = match err {
            TastError::Io(_) => 1,
            TastError::ConfigParse { .. } | TastError::ConfigMissing { .. } => 2,
            TastError::Format { .. } | TastError::InvalidPeriod(_) => 3,
            TastError::IncompleteResult { .. } => 4,
            TastError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
