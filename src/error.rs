use std::io;

use thiserror::Error;

use crate::domain::statement::Stage;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Stage(#[from] StageFailure),
    #[error("server error: {0}")]
    Server(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Why a single chat-completion call gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallFailure {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("service responded with {status}: {body}")]
    BadStatus { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CallFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            CallFailure::Timeout => "timeout",
            CallFailure::Transport(_) => "transport",
            CallFailure::BadStatus { .. } => "bad_status",
            CallFailure::MalformedResponse(_) => "malformed_response",
            CallFailure::Configuration(_) => "configuration",
        }
    }

    /// Missing credentials will not fix themselves between attempts.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CallFailure::Configuration(_))
    }
}

/// A stage that failed, with whatever the run produced before it.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {failure}")]
pub struct StageFailure {
    pub stage: Stage,
    pub failure: CallFailure,
    pub crisis_statement: Option<String>,
}
