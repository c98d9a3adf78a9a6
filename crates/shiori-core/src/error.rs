/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the persisted data model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A `{{path}}` placeholder did not resolve against storage.
    #[error("unresolved storage path: \"{0}\"")]
    UnresolvedPath(String),

    /// A snapshot or save slot could not be decoded.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}
