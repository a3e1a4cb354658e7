use thiserror::Error;
use tradedesk_core::Provenance;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tradedesk_core::ValidationError),

    #[error(transparent)]
    Config(#[from] tradedesk_core::CoreError),

    #[error("strict mode failed: provenance={provenance}, errors={error_count}")]
    StrictModeViolation {
        provenance: Provenance,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(tradedesk_core::CoreError::Io { .. }) => 10,
            Self::Config(_) => 2,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_categories() {
        let strict = CliError::StrictModeViolation {
            provenance: Provenance::Fallback,
            error_count: 3,
        };
        assert_eq!(strict.exit_code(), 5);
        assert_eq!(
            CliError::Validation(tradedesk_core::ValidationError::EmptySymbol).exit_code(),
            2
        );

        let missing = CliError::Config(tradedesk_core::CoreError::Io {
            path: "missing.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(missing.exit_code(), 10);
    }
}
