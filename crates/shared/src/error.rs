use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::AnnouncementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Connection,
    Validation,
    NotFound,
    Write,
    Read,
    Config,
}

impl ErrorCode {
    pub fn title(self) -> &'static str {
        match self {
            ErrorCode::Connection => "Database connection error",
            ErrorCode::Validation => "Invalid input",
            ErrorCode::NotFound => "No such announcement",
            ErrorCode::Write => "Write failed",
            ErrorCode::Read => "Read failed",
            ErrorCode::Config => "Configuration error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{0}")]
    Connection(String),
    #[error("{0}")]
    Validation(String),
    #[error("no announcement with id {0}")]
    NotFound(AnnouncementId),
    #[error("{0}")]
    Write(String),
    #[error("{0}")]
    Read(String),
    #[error("{0}")]
    Config(String),
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BoardError::Connection(_) => ErrorCode::Connection,
            BoardError::Validation(_) => ErrorCode::Validation,
            BoardError::NotFound(_) => ErrorCode::NotFound,
            BoardError::Write(_) => ErrorCode::Write,
            BoardError::Read(_) => ErrorCode::Read,
            BoardError::Config(_) => ErrorCode::Config,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, BoardError::Connection(_) | BoardError::Config(_))
    }
}

pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_and_config_errors_are_fatal() {
        assert!(BoardError::Connection("refused".into()).is_fatal());
        assert!(BoardError::Config("bad toml".into()).is_fatal());
        assert!(!BoardError::validation("empty").is_fatal());
        assert!(!BoardError::NotFound(AnnouncementId(3)).is_fatal());
        assert!(!BoardError::Write("constraint".into()).is_fatal());
    }

    #[test]
    fn keeps_raw_driver_message() {
        let err = BoardError::Write("Duplicate entry '1' for key 'PRIMARY'".into());
        assert_eq!(err.to_string(), "Duplicate entry '1' for key 'PRIMARY'");
        assert_eq!(err.code(), ErrorCode::Write);
    }

    #[test]
    fn serializes_codes_in_snake_case() {
        let raw = serde_json::to_string(&ErrorCode::NotFound).expect("json");
        assert_eq!(raw, "\"not_found\"");
    }
}
