use crate::template::ExtendMode;

pub type DraftResult<T> = Result<T, DraftError>;

#[derive(thiserror::Error, Debug)]
pub enum DraftError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("type mismatch: {material} material is not accepted by a {track} track")]
    TypeMismatch { track: String, material: String },

    #[error("failed to extend segment to {requested} us, tried modes: {attempted:?}")]
    ExtensionFailed {
        requested: i64,
        attempted: Vec<ExtendMode>,
    },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DraftError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
