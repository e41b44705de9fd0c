use thiserror::Error;

/// Main error type for the Pet Battler battle engine
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// Error related to move catalog lookup or loading
    #[error("Move data error: {0}")]
    MoveData(#[from] MoveDataError),
    /// Error related to invalid battle state
    #[error("Battle state error: {0}")]
    BattleState(#[from] BattleStateError),
    /// Error related to invalid player actions
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    /// Error raised by a pet store or currency ledger
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors related to move catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveDataError {
    /// The move is not in the catalog
    #[error("Move not found: {0}")]
    MoveNotFound(String),
    /// The catalog has no level-1 tier or is otherwise unusable
    #[error("Malformed move catalog: {0}")]
    MalformedCatalog(String),
}

/// Errors related to battle state validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleStateError {
    /// A turn was requested after the battle concluded
    #[error("Battle has already concluded")]
    AlreadyConcluded,
    /// The battle was started twice
    #[error("Battle is already in progress")]
    AlreadyStarted,
    /// A turn was requested before the battle was started
    #[error("Battle has not started")]
    NotStarted,
    /// A user tried to fight themselves
    #[error("User {0} cannot battle themselves")]
    SelfBattle(String),
    /// A pet number does not exist in the user's roster
    #[error("Invalid pet index {index} for user {user_id}")]
    InvalidPetIndex { user_id: String, index: usize },
    /// The user has no pets to fight with
    #[error("User {0} has no pets")]
    EmptyRoster(String),
    /// No pending challenge for this user
    #[error("No pending challenge for user {0}")]
    NoPendingChallenge(String),
}

/// Errors related to player actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Move index is out of bounds for the acting side's pool
    #[error("Invalid move index {index} (pool has {pool_size} moves)")]
    InvalidMoveIndex { index: usize, pool_size: usize },
}

/// Errors raised by pet stores and currency ledgers
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Type alias for Results using BattleEngineError
pub type EngineResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using MoveDataError
pub type MoveDataResult<T> = Result<T, MoveDataError>;

/// Type alias for Results using StoreError
pub type StoreResult<T> = Result<T, StoreError>;
