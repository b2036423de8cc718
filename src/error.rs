//! Error types for deep-intel.
//!
//! Errors are layered: [`AgentError`] covers the LLM transport and
//! response parsing, [`StageError`] is what pipeline stages hand back to
//! the orchestrator, [`StorageError`] covers `SQLite` persistence and
//! [`CommandError`] covers the CLI. [`Error`] unifies them for callers
//! that only need `?`.

use thiserror::Error;

/// Result alias using the crate-wide [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// LLM provider or agent failure.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Pipeline stage failure.
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// CLI command failure.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by LLM providers and agents.
#[derive(Error, Debug)]
pub enum AgentError {
    /// No API key was configured.
    #[error("API key missing: set INTEL_API_KEY or OPENAI_API_KEY")]
    ApiKeyMissing,

    /// The configured provider name is not known.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// Transport or API failure.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Underlying error message.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The model answered but the answer could not be parsed.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// What went wrong.
        message: String,
        /// Raw model output.
        content: String,
    },

    /// Every retry attempt failed.
    #[error("gave up after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Message of the last failure.
        message: String,
    },

    /// A research target was rejected before any work started.
    #[error("invalid research target: {message}")]
    InvalidTarget {
        /// Reason for rejection.
        message: String,
    },

    /// Fan-out or task coordination failure.
    #[error("orchestration failed: {message}")]
    Orchestration {
        /// Error detail.
        message: String,
    },
}

/// Coarse classification of a stage failure.
///
/// Callers pick a recovery policy per kind: transient failures degrade the
/// stage output, malformed output falls back to a safe default, and
/// exhausted retries are logged and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network, quota or provider outage.
    Transient,
    /// The model answered with something unusable.
    Malformed,
    /// The retry budget ran out.
    Exhausted,
}

impl ErrorKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Malformed => "malformed",
            Self::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure inside one pipeline stage.
#[derive(Error, Debug, Clone)]
pub enum StageError {
    /// Search or model call failed in a way that may succeed later.
    #[error("{stage}: transient failure: {message}")]
    Transient {
        /// Stage that failed.
        stage: &'static str,
        /// Error detail.
        message: String,
    },

    /// Model output could not be interpreted.
    #[error("{stage}: malformed output: {message}")]
    Malformed {
        /// Stage that failed.
        stage: &'static str,
        /// Error detail.
        message: String,
        /// Raw output that failed to parse.
        content: String,
    },

    /// All retries were spent.
    #[error("{stage}: retries exhausted after {attempts} attempts")]
    Exhausted {
        /// Stage that failed.
        stage: &'static str,
        /// Attempts made before giving up.
        attempts: u32,
    },
}

impl StageError {
    /// Classifies an [`AgentError`] raised while running `stage`.
    #[must_use]
    pub fn from_agent(stage: &'static str, err: AgentError) -> Self {
        match err {
            AgentError::ResponseParse { message, content } => Self::Malformed {
                stage,
                message,
                content,
            },
            AgentError::RetriesExhausted { attempts, .. } => Self::Exhausted { stage, attempts },
            other => Self::Transient {
                stage,
                message: other.to_string(),
            },
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transient { .. } => ErrorKind::Transient,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::Exhausted { .. } => ErrorKind::Exhausted,
        }
    }

    /// Returns the stage that produced the error.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Transient { stage, .. }
            | Self::Malformed { stage, .. }
            | Self::Exhausted { stage, .. } => stage,
        }
    }
}

/// Errors raised by the `SQLite` store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding of a stored payload failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The database directory could not be created.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by CLI commands.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The command ran but failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// A flag or argument value was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be rendered.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_from_parse_is_malformed() {
        let err = StageError::from_agent(
            "evaluator",
            AgentError::ResponseParse {
                message: "bad json".to_string(),
                content: "{".to_string(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.stage(), "evaluator");
    }

    #[test]
    fn test_stage_error_from_api_is_transient() {
        let err = StageError::from_agent(
            "researcher",
            AgentError::ApiRequest {
                message: "503".to_string(),
                status: Some(503),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.to_string().contains("researcher"));
    }

    #[test]
    fn test_stage_error_from_retries_is_exhausted() {
        let err = StageError::from_agent(
            "planner",
            AgentError::RetriesExhausted {
                attempts: 3,
                message: "timeout".to_string(),
            },
        );
        assert_eq!(err.kind(), ErrorKind::Exhausted);
        assert_eq!(err.to_string(), "planner: retries exhausted after 3 attempts");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = CommandError::InvalidArgument("domain".to_string()).into();
        assert!(err.to_string().contains("invalid argument: domain"));
    }
}
