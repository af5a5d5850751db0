use thiserror::Error;

/// Failures reported by the document selection service.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("window is no longer alive")]
    WindowGone,
    #[error("element is no longer alive")]
    ElementGone,
    #[error("element is not an editable field")]
    NotEditable,
    #[error("selection has no range")]
    NoRange,
    #[error("word movement failed: {0}")]
    WordMove(String),
}

/// Failures reported by the handle renderer.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("shell is disconnected")]
    Disconnected,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Reasons a selection session could not start or had to be abandoned.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no word at the requested point")]
    EmptyWord,
    #[error("selection has no client rects")]
    NoGeometry,
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Shell(#[from] ShellError),
}
