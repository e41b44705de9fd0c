//! Challenge bookkeeping and the fight flow around the battle engine.
//!
//! The arena resolves pets from the store, runs the battle, writes both
//! rosters back and pays the winner. All roster and balance writes for a user
//! go through that user's lock; two-user operations take both locks in
//! sorted order.

use crate::battle::engine::{BattleEngine, BattleResult};
use crate::battle::input::MoveSource;
use crate::battle::state::{Side, TurnRng};
use crate::errors::{BattleStateError, EngineResult};
use crate::pet::Pet;
use crate::progression::calculate_reward;
use crate::store::{CurrencyLedger, PetStore};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A fight offer waiting for the target's answer. Pet indices are zero-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub challenger_id: String,
    pub challenger_pet: usize,
    pub target_id: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FightOutcome {
    pub result: BattleResult,
    /// Owners of side A and side B.
    pub owners: [String; 2],
    /// Coins paid to the winner; zero on a draw.
    pub reward: u32,
    pub winner_balance: Option<u64>,
}

impl FightOutcome {
    pub fn winner_id(&self) -> Option<&str> {
        self.result
            .winner
            .map(|side| self.owners[side.index()].as_str())
    }
}

pub struct Arena {
    engine: BattleEngine,
    pets: Arc<dyn PetStore>,
    ledger: Arc<dyn CurrencyLedger>,
    /// Keyed by target user; a newer challenge replaces the older one.
    pending: DashMap<String, Challenge>,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Arena {
    pub fn new(engine: BattleEngine, pets: Arc<dyn PetStore>, ledger: Arc<dyn CurrencyLedger>) -> Self {
        Self {
            engine,
            pets,
            ledger,
            pending: DashMap::new(),
            user_locks: DashMap::new(),
        }
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn pending_challenge(&self, target_id: &str) -> Option<Challenge> {
        self.pending.get(target_id).map(|entry| entry.clone())
    }

    /// Record a challenge from `challenger_id`'s pet against `target_id`.
    pub async fn challenge(
        &self,
        challenger_id: &str,
        challenger_pet: usize,
        target_id: &str,
    ) -> EngineResult<Challenge> {
        if challenger_id == target_id {
            return Err(BattleStateError::SelfBattle(challenger_id.to_string()).into());
        }
        let roster = self.pets.get_pets(challenger_id).await?;
        if roster.is_empty() {
            return Err(BattleStateError::EmptyRoster(challenger_id.to_string()).into());
        }
        pick_pet(&roster, challenger_id, challenger_pet)?;
        if self.pets.get_pets(target_id).await?.is_empty() {
            return Err(BattleStateError::EmptyRoster(target_id.to_string()).into());
        }

        let challenge = Challenge {
            challenger_id: challenger_id.to_string(),
            challenger_pet,
            target_id: target_id.to_string(),
            issued_at: self.engine.cooldowns().now(),
        };
        if let Some(previous) = self.pending.insert(target_id.to_string(), challenge.clone()) {
            tracing::debug!(target_id, replaced = %previous.challenger_id, "Replaced pending challenge");
        }
        tracing::info!(challenger_id, target_id, "Challenge issued");
        Ok(challenge)
    }

    pub fn decline(&self, target_id: &str) -> EngineResult<Challenge> {
        let (_, challenge) = self
            .pending
            .remove(target_id)
            .ok_or_else(|| BattleStateError::NoPendingChallenge(target_id.to_string()))?;
        tracing::info!(target_id, challenger_id = %challenge.challenger_id, "Challenge declined");
        Ok(challenge)
    }

    /// Accept the pending challenge with `target_pet` and fight it out. The
    /// challenger is side A. An invalid pet index leaves the challenge pending.
    pub async fn accept(
        &self,
        target_id: &str,
        target_pet: usize,
        source: &mut dyn MoveSource,
        rng: &mut TurnRng,
    ) -> EngineResult<FightOutcome> {
        if !self.pending.contains_key(target_id) {
            return Err(BattleStateError::NoPendingChallenge(target_id.to_string()).into());
        }
        pick_pet(&self.pets.get_pets(target_id).await?, target_id, target_pet)?;
        // Only the caller that removes the challenge gets to fight it.
        let Some((_, challenge)) = self.pending.remove(target_id) else {
            return Err(BattleStateError::NoPendingChallenge(target_id.to_string()).into());
        };

        self.fight(
            &challenge.challenger_id,
            challenge.challenger_pet,
            target_id,
            target_pet,
            source,
            rng,
        )
        .await
    }

    /// Run a battle between two stored pets and persist the outcome.
    pub async fn fight(
        &self,
        owner_a: &str,
        pet_a: usize,
        owner_b: &str,
        pet_b: usize,
        source: &mut dyn MoveSource,
        rng: &mut TurnRng,
    ) -> EngineResult<FightOutcome> {
        if owner_a == owner_b {
            return Err(BattleStateError::SelfBattle(owner_a.to_string()).into());
        }
        let guards = self.lock_pair(owner_a, owner_b).await;
        let outcome = self.fight_locked(owner_a, pet_a, owner_b, pet_b, source, rng).await;
        drop(guards);
        self.release_idle_locks(&[owner_a, owner_b]);
        outcome
    }

    async fn fight_locked(
        &self,
        owner_a: &str,
        pet_a: usize,
        owner_b: &str,
        pet_b: usize,
        source: &mut dyn MoveSource,
        rng: &mut TurnRng,
    ) -> EngineResult<FightOutcome> {
        let mut roster_a = self.pets.get_pets(owner_a).await?;
        let mut roster_b = self.pets.get_pets(owner_b).await?;
        let before_a = pick_pet(&roster_a, owner_a, pet_a)?;
        let before_b = pick_pet(&roster_b, owner_b, pet_b)?;

        let result = self
            .engine
            .start_battle(before_a.clone(), owner_a, before_b.clone(), owner_b, source, rng)
            .await?;

        roster_a[pet_a] = result.pet(Side::A).clone();
        roster_b[pet_b] = result.pet(Side::B).clone();
        self.pets.set_pets(owner_a, roster_a).await?;
        self.pets.set_pets(owner_b, roster_b).await?;

        // Rewards are judged on the pets as they entered the fight.
        let (reward, winner_balance) = match result.winner {
            Some(side) => {
                let (winner_id, winner, loser) = match side {
                    Side::A => (owner_a, &before_a, &before_b),
                    Side::B => (owner_b, &before_b, &before_a),
                };
                let reward = calculate_reward(winner, loser, &self.engine.tuning().reward);
                let balance = self.ledger.add_coins(winner_id, reward as u64).await?;
                tracing::info!(winner_id, reward, balance, "Fight reward paid");
                (reward, Some(balance))
            }
            None => (0, None),
        };

        Ok(FightOutcome {
            result,
            owners: [owner_a.to_string(), owner_b.to_string()],
            reward,
            winner_balance,
        })
    }

    fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks.entry(user_id.to_string()).or_default().clone()
    }

    /// Forget a user's lock once no fight holds or waits on it.
    fn release_idle_locks(&self, user_ids: &[&str]) {
        for user_id in user_ids {
            self.user_locks
                .remove_if(*user_id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }

    pub fn tracked_locks(&self) -> usize {
        self.user_locks.len()
    }

    /// Lock both users, lower id first.
    async fn lock_pair(&self, first: &str, second: &str) -> [OwnedMutexGuard<()>; 2] {
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        let low_guard = self.user_lock(low).lock_owned().await;
        let high_guard = self.user_lock(high).lock_owned().await;
        [low_guard, high_guard]
    }
}

fn pick_pet(roster: &[Pet], user_id: &str, index: usize) -> EngineResult<Pet> {
    roster.get(index).cloned().ok_or_else(|| {
        BattleStateError::InvalidPetIndex {
            user_id: user_id.to_string(),
            index,
        }
        .into()
    })
}
