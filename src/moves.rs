//! The move catalog: level-gated move tiers and per-species domain expansions.

use crate::errors::{ConfigError, MoveDataError, MoveDataResult};
use schema::{DomainExpansion, MoveData, MoveTier, Species, DOMAIN_EXPANSION_MOVE};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveCatalog {
    tiers: Vec<MoveTier>,
    domains: Vec<DomainExpansion>,
}

impl MoveCatalog {
    /// Build a catalog, sorting tiers by unlock level. A catalog without a
    /// level 1 tier is rejected: every pet must have something to use.
    pub fn new(mut tiers: Vec<MoveTier>, domains: Vec<DomainExpansion>) -> MoveDataResult<Self> {
        // Stable sort keeps declaration order among tiers sharing a level.
        tiers.sort_by_key(|tier| tier.unlock_level);
        match tiers.first() {
            Some(tier) if tier.unlock_level <= 1 && !tier.moves.is_empty() => {}
            _ => {
                return Err(MoveDataError::MalformedCatalog(
                    "catalog needs a non-empty level 1 tier".to_string(),
                ))
            }
        }
        if let Some(clash) = tiers
            .iter()
            .flat_map(|tier| tier.moves.iter())
            .find(|data| data.name == DOMAIN_EXPANSION_MOVE)
        {
            return Err(MoveDataError::MalformedCatalog(format!(
                "'{}' is reserved",
                clash.name
            )));
        }
        Ok(Self { tiers, domains })
    }

    /// The reference tuning: unlocks at 1, 5, 10, 15, 20, 25 and 30.
    pub fn standard() -> Self {
        let tier = |unlock_level: u32, moves: [(&str, u32, u8); 2]| MoveTier {
            unlock_level,
            moves: moves
                .iter()
                .map(|(name, power, accuracy)| MoveData::new(name, *power, *accuracy))
                .collect(),
        };
        let tiers = vec![
            tier(1, [("Tackle", 20, 95), ("Scratch", 25, 90)]),
            tier(5, [("Bite", 30, 90), ("Headbutt", 35, 85)]),
            tier(10, [("Flame Burst", 45, 85), ("Aqua Jet", 40, 90)]),
            tier(15, [("Thunder Punch", 55, 80), ("Leaf Blade", 50, 85)]),
            tier(20, [("Iron Tail", 65, 75), ("Shadow Claw", 60, 80)]),
            tier(25, [("Psychic Blast", 75, 70), ("Dragon Rush", 80, 65)]),
            tier(30, [("Meteor Crash", 95, 60), ("Final Roar", 100, 55)]),
        ];

        let domain = |species: Species, name: &str, power: u32, description: &str| DomainExpansion {
            species,
            name: name.to_string(),
            power,
            description: description.to_string(),
        };
        let domains = vec![
            domain(Species::Dragon, "Infinite Inferno Sanctum", 40, "A realm of endless dragonfire engulfs the foe."),
            domain(Species::Cactus, "Thousand Needle Desert", 35, "Sand and spines close in from every side."),
            domain(Species::Toaster, "Eternal Breakfast Dimension", 35, "Everything is toast. Forever."),
            domain(Species::Penguin, "Absolute Zero Glacier", 38, "The arena freezes solid around the opponent."),
            domain(Species::Cloud, "Endless Storm Canopy", 36, "Lightning falls from a sky with no horizon."),
            domain(Species::Robot, "Overclocked Grid Protocol", 38, "Every circuit in the arena targets one foe."),
            domain(Species::Phoenix, "Rebirth Flame Cycle", 42, "Ash and fire return again and again."),
            domain(Species::Jellyfish, "Abyssal Tide Prison", 36, "Stinging currents bind the opponent in place."),
            domain(Species::Unicorn, "Prismatic Dream Realm", 40, "Blinding rainbow light pierces the foe."),
        ];

        // The literal tables above always satisfy `new`'s checks.
        Self { tiers, domains }
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let raw: MoveCatalog = ron::from_str(content)?;
        MoveCatalog::new(raw.tiers, raw.domains).map_err(|err| ConfigError::InvalidValue {
            key: "catalog".to_string(),
            value: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    /// Names of every move unlocked at `level`, lowest tier first and in
    /// declaration order within a tier.
    pub fn move_pool(&self, level: u32) -> Vec<String> {
        let mut pool: Vec<String> = self
            .tiers
            .iter()
            .enumerate()
            .filter(|(i, tier)| *i == 0 || tier.unlock_level <= level)
            .flat_map(|(_, tier)| tier.moves.iter().map(|data| data.name.clone()))
            .collect();
        // Names repeated across tiers keep their first position.
        let mut seen = std::collections::HashSet::new();
        pool.retain(|name| seen.insert(name.clone()));
        pool
    }

    pub fn get_move_data(&self, name: &str) -> MoveDataResult<&MoveData> {
        self.tiers
            .iter()
            .flat_map(|tier| tier.moves.iter())
            .find(|data| data.name == name)
            .ok_or_else(|| MoveDataError::MoveNotFound(name.to_string()))
    }

    pub fn domain_expansion(&self, species: Species) -> Option<&DomainExpansion> {
        self.domains.iter().find(|domain| domain.species == species)
    }

    pub fn tiers(&self) -> &[MoveTier] {
        &self.tiers
    }
}

impl Default for MoveCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
