//! Error types for deck-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid line number {line}: content has {line_count} lines")]
    InvalidLineNumber { line: usize, line_count: usize },
}
