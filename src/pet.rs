use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use schema::{Rarity, Species, COLORS, TRAITS};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;

fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PetRecord")]
pub struct Pet {
    pub name: String,
    pub species: Species,
    pub health: u32,
    pub happiness: u32,
    pub strength: u32,
    pub rarity: Rarity,
    pub level: u32,
    pub xp: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A stored pet as it may appear on disk. Older rosters carry no `species`
/// field (it is the last word of the name) and stamp `created_at` as float
/// epoch seconds.
#[derive(Deserialize)]
struct PetRecord {
    name: String,
    #[serde(default)]
    species: Option<Species>,
    health: u32,
    happiness: u32,
    strength: u32,
    #[serde(default)]
    rarity: Rarity,
    #[serde(default = "default_level")]
    level: u32,
    #[serde(default)]
    xp: u32,
    #[serde(default)]
    created_at: Option<CreatedAt>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CreatedAt {
    Rfc3339(DateTime<Utc>),
    EpochSeconds(f64),
}

impl CreatedAt {
    fn into_datetime(self) -> Result<DateTime<Utc>, String> {
        match self {
            CreatedAt::Rfc3339(at) => Ok(at),
            CreatedAt::EpochSeconds(seconds) => {
                let whole = seconds.floor();
                let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
                DateTime::from_timestamp(whole as i64, nanos)
                    .ok_or_else(|| format!("created_at {} is out of range", seconds))
            }
        }
    }
}

fn species_from_name(name: &str) -> Option<Species> {
    name.split_whitespace().last()?.parse().ok()
}

impl TryFrom<PetRecord> for Pet {
    type Error = String;

    fn try_from(record: PetRecord) -> Result<Self, Self::Error> {
        let species = match record.species {
            Some(species) => species,
            None => species_from_name(&record.name)
                .ok_or_else(|| format!("no species given and none named in '{}'", record.name))?,
        };
        let created_at = record.created_at.map(CreatedAt::into_datetime).transpose()?;
        Ok(Self {
            name: record.name,
            species,
            health: record.health,
            happiness: record.happiness,
            strength: record.strength,
            rarity: record.rarity,
            level: record.level,
            xp: record.xp,
            created_at,
        })
    }
}

impl Pet {
    /// Create a level 1 pet with explicit stats. The name is derived from
    /// the given color and trait words plus the species.
    pub fn new(
        color: &str,
        trait_word: &str,
        species: Species,
        rarity: Rarity,
        health: u32,
        happiness: u32,
        strength: u32,
    ) -> Self {
        let base_name = format!("{} {} {}", color, trait_word, species);
        let name = match rarity {
            Rarity::Mythic => format!("Mythic {}", base_name),
            _ => base_name,
        };
        Self {
            name,
            species,
            health,
            happiness,
            strength,
            rarity,
            level: 1,
            xp: 0,
            created_at: None,
        }
    }

    /// Roll a fresh pet of the given rarity.
    pub fn generate<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> Self {
        let (health, happiness, strength) = match rarity {
            Rarity::Common => (50..=80, 50..=80, 10..=25),
            Rarity::Rare => (70..=95, 70..=95, 25..=35),
            Rarity::Mythic => (85..=100, 85..=100, 40..=50),
        };
        let all_species: Vec<Species> = Species::iter().collect();
        let color = COLORS.choose(rng).copied().unwrap_or(COLORS[0]);
        let trait_word = TRAITS.choose(rng).copied().unwrap_or(TRAITS[0]);
        let species = all_species
            .choose(rng)
            .copied()
            .unwrap_or(Species::Dragon);

        let mut pet = Pet::new(
            color,
            trait_word,
            species,
            rarity,
            rng.random_range(health),
            rng.random_range(happiness),
            rng.random_range(strength),
        );
        pet.created_at = Some(Utc::now());
        pet
    }

    pub fn is_mythic(&self) -> bool {
        self.rarity == Rarity::Mythic
    }

    /// XP required to advance from the current level.
    pub fn xp_needed(&self, xp_per_level: u32) -> u32 {
        self.level * xp_per_level
    }
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Level: {}, Health: {}, Happiness: {}, Strength: {}, Rarity: {})",
            self.name, self.level, self.health, self.happiness, self.strength, self.rarity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_stats_respect_rarity_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let common = Pet::generate(Rarity::Common, &mut rng);
            assert!((50..=80).contains(&common.health));
            assert!((10..=25).contains(&common.strength));

            let mythic = Pet::generate(Rarity::Mythic, &mut rng);
            assert!((85..=100).contains(&mythic.health));
            assert!((40..=50).contains(&mythic.strength));
            assert!(mythic.name.starts_with("Mythic "));
            assert!(mythic.name.ends_with(&mythic.species.to_string()));
        }
    }

    #[test]
    fn test_new_pet_starts_at_level_one() {
        let pet = Pet::new("Icy", "Fluffy", Species::Penguin, Rarity::Rare, 80, 70, 30);
        assert_eq!(pet.name, "Icy Fluffy Penguin");
        assert_eq!(pet.level, 1);
        assert_eq!(pet.xp, 0);
        assert_eq!(pet.xp_needed(100), 100);
    }

    #[test]
    fn test_legacy_record_defaults_level_and_xp() {
        let json = r#"{
            "name": "Neon Spiky Cactus",
            "species": "Cactus",
            "health": 60,
            "happiness": 55,
            "strength": 12,
            "rarity": "common"
        }"#;
        let pet: Pet = serde_json::from_str(json).unwrap();
        assert_eq!(pet.level, 1);
        assert_eq!(pet.xp, 0);
        assert_eq!(pet.rarity, Rarity::Common);
        assert_eq!(pet.created_at, None);
    }

    #[test]
    fn test_record_without_species_and_with_epoch_timestamp() {
        let json = r#"{
            "name": "Mythic Golden Winged Dragon",
            "health": 92,
            "happiness": 88,
            "strength": 47,
            "rarity": "mythic",
            "created_at": 1700000000.25
        }"#;
        let pet: Pet = serde_json::from_str(json).unwrap();
        assert_eq!(pet.species, Species::Dragon);
        assert_eq!(pet.rarity, Rarity::Mythic);
        assert_eq!(pet.level, 1);
        let created_at = pet.created_at.unwrap();
        assert_eq!(created_at.timestamp(), 1_700_000_000);
        assert_eq!(created_at.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_written_pet_reads_back() {
        let mut pet = Pet::new("Icy", "Fluffy", Species::Penguin, Rarity::Rare, 80, 70, 30);
        pet.created_at = DateTime::from_timestamp(1_700_000_000, 0);
        let json = serde_json::to_string(&pet).unwrap();
        assert_eq!(serde_json::from_str::<Pet>(&json).unwrap(), pet);
    }

    #[test]
    fn test_unknown_species_word_is_rejected() {
        let json = r#"{"name": "Neon Spiky Teapot", "health": 60, "happiness": 55, "strength": 12}"#;
        let err = serde_json::from_str::<Pet>(json).unwrap_err();
        assert!(err.to_string().contains("Neon Spiky Teapot"));
    }
}
