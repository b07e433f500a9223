use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database driver error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Error serializing BSON: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("Error deserializing BSON: {0}")]
    BsonDeserialization(#[from] bson::de::Error),

    #[error("Error serializing data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Error managing index: {0}")]
    IndexError(String),

    #[error("Generic flagged error: {0}")]
    Generic(String),
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;
