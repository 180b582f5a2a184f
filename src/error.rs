use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scheduler configuration JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write event log: {0}")]
    ExportError(#[from] csv::Error),

    #[error("Invalid task descriptor '{id}': {reason}")]
    InvalidTaskDescriptor { id: String, reason: String },

    #[error("Invalid node descriptor '{id}': {reason}")]
    InvalidNodeDescriptor { id: String, reason: String },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("A scheduler needs at least one node")]
    EmptyNodePool,

    #[error("Failed to build scheduler from configuration: {0}")]
    Conversion(#[from] ConversionError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Unknown node selector type: '{0}'")]
    UnknownSelectorType(String),

    #[error("Unknown blocked task policy: '{0}'")]
    UnknownBlockedPolicy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
