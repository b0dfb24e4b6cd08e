use thiserror::Error;

use cashcycle_core::UniverseError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] cashcycle_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("configuration error: {0}")]
    Config(#[from] cashcycle_core::ConfigError),

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("export failed: {0}")]
    Export(#[from] cashcycle_core::ExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Universe(UniverseError::Io { .. }) => 10,
            Self::Universe(_) => 2,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Config(_) => 7,
            Self::Export(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
