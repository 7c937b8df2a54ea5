use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,
    #[error("line has no command: {line}")]
    MissingCommand { line: String },
    #[error("invalid command {command:?}")]
    InvalidCommand { command: String },
}
