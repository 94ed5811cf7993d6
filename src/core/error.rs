use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("Duplicate entity id '{0}'")]
    DuplicateEntity(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Commit failed: {0}")]
    CommitFailure(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
