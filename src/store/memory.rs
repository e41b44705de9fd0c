use crate::errors::StoreResult;
use crate::pet::Pet;
use crate::store::{CurrencyLedger, PetStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local rosters and balances.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    pets: RwLock<HashMap<String, Vec<Pet>>>,
    coins: RwLock<HashMap<String, u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PetStore for InMemoryStore {
    async fn get_pets(&self, user_id: &str) -> StoreResult<Vec<Pet>> {
        Ok(self.pets.read().await.get(user_id).cloned().unwrap_or_default())
    }

    async fn set_pets(&self, user_id: &str, pets: Vec<Pet>) -> StoreResult<()> {
        self.pets.write().await.insert(user_id.to_string(), pets);
        Ok(())
    }
}

#[async_trait]
impl CurrencyLedger for InMemoryStore {
    async fn add_coins(&self, user_id: &str, amount: u64) -> StoreResult<u64> {
        let mut coins = self.coins.write().await;
        let balance = coins.entry(user_id.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(*balance)
    }

    async fn balance(&self, user_id: &str) -> StoreResult<u64> {
        Ok(self.coins.read().await.get(user_id).copied().unwrap_or(0))
    }
}
