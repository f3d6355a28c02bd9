use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickerboard_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error("symbols not in catalog: {}", .0.join(", "))]
    UnknownSymbols(Vec<String>),

    #[error(transparent)]
    Source(#[from] tickerboard_core::SourceError),

    #[error(transparent)]
    Catalog(#[from] tickerboard_core::CatalogError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] tickerboard_core::ConfigError),

    #[error(transparent)]
    Export(#[from] tickerboard_core::ExportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::UnknownSymbols(_) => 2,
            Self::Source(_) => 3,
            Self::Catalog(_) => 4,
            Self::Serialization(_) => 5,
            Self::Config(_) => 6,
            Self::Export(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
