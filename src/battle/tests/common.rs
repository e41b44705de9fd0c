use crate::battle::engine::BattleEngine;
use crate::battle::input::{MoveChoice, MoveRequest, MoveSource, ScriptedMoveSource, SplitMoveSource};
use crate::battle::state::TurnRng;
use crate::clock::ManualClock;
use crate::config::BattleTuning;
use crate::cooldown::DomainCooldowns;
use crate::moves::MoveCatalog;
use crate::pet::Pet;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use schema::{Rarity, Species};
use std::sync::Arc;

/// A builder for creating test pets with common defaults.
///
/// # Example
/// ```ignore
/// let pet = TestPetBuilder::new(Species::Dragon)
///     .with_rarity(Rarity::Mythic)
///     .with_strength(45)
///     .build();
/// ```
pub struct TestPetBuilder {
    species: Species,
    rarity: Rarity,
    color: &'static str,
    health: u32,
    strength: u32,
    level: u32,
    xp: u32,
}

impl TestPetBuilder {
    /// Creates a level 1 common pet with 100 health and 20 strength.
    pub fn new(species: Species) -> Self {
        Self {
            species,
            rarity: Rarity::Common,
            color: "Azure",
            health: 100,
            strength: 20,
            level: 1,
            xp: 0,
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    /// Changes the color word, and so the pet's name.
    pub fn with_color(mut self, color: &'static str) -> Self {
        self.color = color;
        self
    }

    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    pub fn with_strength(mut self, strength: u32) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_xp(mut self, xp: u32) -> Self {
        self.xp = xp;
        self
    }

    pub fn build(self) -> Pet {
        let mut pet = Pet::new(
            self.color,
            "Brave",
            self.species,
            self.rarity,
            self.health,
            60,
            self.strength,
        );
        pet.level = self.level;
        pet.xp = self.xp;
        pet
    }
}

/// An engine over the standard catalog and default tuning, with a clock the
/// test controls.
pub fn create_test_engine() -> (BattleEngine, Arc<ManualClock>) {
    create_test_engine_with(MoveCatalog::standard(), BattleTuning::default())
}

pub fn create_test_engine_with(catalog: MoveCatalog, tuning: BattleTuning) -> (BattleEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    ));
    let cooldowns = Arc::new(DomainCooldowns::new(clock.clone(), tuning.domain_cooldown()));
    let engine = BattleEngine::new(Arc::new(catalog), cooldowns, tuning);
    (engine, clock)
}

/// Every accuracy roll is 1, so every move with accuracy above 0 lands.
pub fn predictable_rng() -> TurnRng {
    TurnRng::fixed(1)
}

/// Side A always picks `a_index`, side B always picks `b_index`.
pub fn fixed_choices(a_index: usize, b_index: usize) -> SplitMoveSource {
    SplitMoveSource::new(
        Box::new(ScriptedMoveSource::new(vec![MoveChoice::Selected(a_index); 500])),
        Box::new(ScriptedMoveSource::new(vec![MoveChoice::Selected(b_index); 500])),
    )
}

/// A source that never answers.
pub struct StalledMoveSource;

#[async_trait]
impl MoveSource for StalledMoveSource {
    async fn request_move(&mut self, _request: MoveRequest) -> MoveChoice {
        std::future::pending::<MoveChoice>().await
    }
}
