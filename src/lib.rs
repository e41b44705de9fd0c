//! Pet Battler Battle Engine
//!
//! Turn-based battles between collectible pets: level-gated move pools,
//! once-a-day domain expansions for mythic pets, experience and leveling,
//! and fight rewards. Storage and user input are injected through traits.

// --- MODULE DECLARATIONS ---
pub mod arena;
pub mod battle;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod errors;
pub mod moves;
pub mod pet;
pub mod progression;
pub mod store;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{DomainExpansion, MoveData, MoveTier, Rarity, Species, DOMAIN_EXPANSION_MOVE};

// --- From this crate's modules (`src/`) ---

// Core battle engine and state.
pub use battle::engine::{BattleEngine, BattleResult};
pub use battle::state::{BattleEvent, BattleState, Side, TurnRng};

// Move selection.
pub use battle::ai::{AiMoveSource, Behavior, ScoringAI};
pub use battle::input::{ChannelMoveSource, MoveChoice, MoveRequest, MoveSource, PlayerInput};

// Domain model and rules.
pub use arena::{Arena, Challenge, FightOutcome};
pub use config::{BattleTuning, GameConfig, RewardTuning};
pub use cooldown::DomainCooldowns;
pub use moves::MoveCatalog;
pub use pet::Pet;
pub use progression::{add_experience, calculate_reward, LevelUp};
pub use store::{CurrencyLedger, InMemoryStore, JsonFileStore, PetStore};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleStateError, ConfigError, EngineResult, MoveDataError,
    MoveDataResult, StoreError, StoreResult,
};
