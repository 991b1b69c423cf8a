use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostitError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Panel error: {0}")]
    Panel(String),

    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    #[error("Note not found at index {0}")]
    NoteNotFound(usize),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PostitError>;
