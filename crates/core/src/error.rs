#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown filter field: {0}")]
    UnknownFilterField(String),
    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("invalid date boundary (expected utc, local or +HH:MM): {0}")]
    InvalidDateBoundary(String),
    #[error("failed to read data file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write data file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to create state directory: {0}")]
    StateDirCreation(std::io::Error),
    #[error("failed to serialize: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize {file}: {source}")]
    Deserialization {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type ContactsResult<T> = std::result::Result<T, ContactsError>;
