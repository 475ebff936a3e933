pub type StarcardResult<T> = Result<T, StarcardError>;

#[derive(thiserror::Error, Debug)]
pub enum StarcardError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("capability unavailable: {0}")]
    Capability(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StarcardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StarcardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
