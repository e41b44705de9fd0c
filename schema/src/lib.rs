// Pet Battler Schema - Shared type definitions
// This crate contains the static enums and catalog record types that are
// shared between the battle engine and anything that reads or writes
// pet data (stores, tuning files, presentation).

// Re-export the main types
pub use battle_data::*;
pub use pet_types::*;

pub mod battle_data;
pub mod pet_types;
