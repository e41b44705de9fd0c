//! Roster and currency persistence seams.
//!
//! The battle engine never touches storage; the arena reads pets from a
//! `PetStore` and pays out through a `CurrencyLedger`.

use crate::errors::StoreResult;
use crate::pet::Pet;
use async_trait::async_trait;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetStore: Send + Sync {
    /// The user's roster in order; empty for unknown users.
    async fn get_pets(&self, user_id: &str) -> StoreResult<Vec<Pet>>;
    /// Replace the user's roster.
    async fn set_pets(&self, user_id: &str, pets: Vec<Pet>) -> StoreResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyLedger: Send + Sync {
    /// Credit `amount` and return the new balance.
    async fn add_coins(&self, user_id: &str, amount: u64) -> StoreResult<u64>;
    async fn balance(&self, user_id: &str) -> StoreResult<u64>;
}
