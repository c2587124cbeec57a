use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    /// Structural validation failed; every violation is listed.
    #[error("invalid execution request: {}", .0.join("; "))]
    InvalidRequest(Vec<String>),

    /// The process could not be started at all.
    #[error("failed to start command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The wall-clock timeout fired; the child has been killed.
    #[error("Command timed out")]
    Timeout,

    /// The process exited with a non-zero status.
    #[error("{message}")]
    Failed { code: i32, message: String },
}
