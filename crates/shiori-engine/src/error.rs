use shiori_core::{CoreError, Cursor};

use crate::store::StoreError;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while running or reverting statements.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A lifecycle guard vetoed the statement. Expected control flow: this is
    /// how an action blocks progress until external input arrives.
    #[error("statement rejected: {0}")]
    Rejected(String),

    /// A statement referred to a label that does not exist.
    #[error("label not found: \"{label}\"")]
    UnresolvedTarget {
        /// The missing label.
        label: String,
    },

    /// There is no statement at the requested position (end of a label or a
    /// missing label).
    #[error("no statement at {0}")]
    NoStatement(Cursor),

    /// No registered action accepts the statement.
    #[error("no action matches statement: {0}")]
    NoMatch(String),

    /// The statement at the position has no backward execution.
    #[error("statement at {0} cannot be reverted")]
    Irreversible(Cursor),

    /// A single run or revert executed more statements than allowed.
    #[error("chain exceeded {limit} statements at {cursor}")]
    ChainLimit {
        /// Configured maximum.
        limit: usize,
        /// Where the chain was stopped.
        cursor: Cursor,
    },

    /// A callback statement failed.
    #[error("callback failed: {0}")]
    Callback(String),

    /// Substitution or snapshot error from the data model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The persistence boundary failed. Propagated unchanged.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),

    /// The script could not be decoded.
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
}

impl EngineError {
    /// A guard rejection without a particular reason.
    pub fn rejected() -> Self {
        Self::Rejected("guard not met".into())
    }

    /// A guard rejection with a reason.
    pub fn rejected_because(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    /// Whether this is a guard rejection (as opposed to a structural failure).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
