use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("'{0}' carries no message contract")]
    MissingContract(String),

    #[error("field '{field}' of message '{message}' requires a nested message type")]
    MissingNestedType { message: String, field: String },

    #[error("unsupported wire kind: {0}")]
    UnsupportedKind(String),

    #[error("cyclic message contract detected at '{0}'")]
    CyclicSchema(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("schema export error: {0}")]
    Export(#[from] serde_json::Error),
}
