use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] creditlens_core::ValidationError),

    #[error(transparent)]
    Input(#[from] creditlens_core::InputError),

    #[error(transparent)]
    Config(#[from] creditlens_core::ConfigError),

    #[error(transparent)]
    InsufficientData(#[from] creditlens_core::InsufficientDataError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] creditlens_core::ModelError),

    #[error("warehouse error: {0}")]
    Warehouse(#[from] creditlens_warehouse::WarehouseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("command error: {0}")]
    Command(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Input(_) | Self::Config(_) | Self::Command(_) => 2,
            Self::InsufficientData(_) => 3,
            Self::Serialization(_) => 4,
            Self::Model(_) => 6,
            Self::Warehouse(_) => 7,
            Self::Io(_) | Self::Task(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        let insufficient = CliError::from(creditlens_core::InsufficientDataError {
            ticker: String::from("ACME"),
        });
        assert_eq!(insufficient.exit_code(), 3);

        let validation = CliError::from(creditlens_core::ValidationError::EmptyTicker);
        assert_eq!(validation.exit_code(), 2);

        let model = CliError::from(creditlens_core::ModelError::Invalid(String::from("empty")));
        assert_eq!(model.exit_code(), 6);

        let io = CliError::from(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 10);
    }
}
