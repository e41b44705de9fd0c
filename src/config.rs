//! Runtime configuration.
//!
//! `BattleTuning` holds the numbers the battle engine and progression rules
//! run on; it can be overridden from a RON file. `GameConfig` collects the
//! deployment settings read from the environment (and `.env`).

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Coin reward constants for a won fight.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RewardTuning {
    pub base: u32,
    /// Paid per level the loser was above the winner.
    pub per_level_bonus: u32,
    pub rare_bonus: u32,
    pub mythic_bonus: u32,
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            base: 50,
            per_level_bonus: 10,
            rare_bonus: 25,
            mythic_bonus: 50,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BattleTuning {
    pub xp_per_level: u32,
    pub max_level: u32,
    pub max_health: u32,
    pub max_strength: u32,
    pub winner_xp: u32,
    pub loser_xp: u32,
    pub move_timeout_secs: u64,
    /// Turns after which a battle is ruled a draw.
    pub max_turns: u32,
    pub domain_cooldown_hours: i64,
    pub reward: RewardTuning,
}

impl Default for BattleTuning {
    fn default() -> Self {
        Self {
            xp_per_level: 100,
            max_level: 50,
            max_health: 100,
            max_strength: 50,
            winner_xp: 50,
            loser_xp: 25,
            move_timeout_secs: 30,
            max_turns: 200,
            domain_cooldown_hours: 24,
            reward: RewardTuning::default(),
        }
    }
}

impl BattleTuning {
    pub fn move_timeout(&self) -> Duration {
        Duration::from_secs(self.move_timeout_secs)
    }

    pub fn domain_cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(self.domain_cooldown_hours)
    }

    /// Parse tuning from RON text. Missing fields keep their defaults.
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let tuning: BattleTuning = ron::from_str(content)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("xp_per_level", self.xp_per_level as i64),
            ("max_level", self.max_level as i64),
            ("max_health", self.max_health as i64),
            ("max_turns", self.max_turns as i64),
            ("move_timeout_secs", self.move_timeout_secs as i64),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        if self.domain_cooldown_hours < 0 {
            return Err(ConfigError::InvalidValue {
                key: "domain_cooldown_hours".to_string(),
                value: self.domain_cooldown_hours.to_string(),
            });
        }
        Ok(())
    }
}

/// Deployment settings, mirroring the bot's environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub pet_file: PathBuf,
    pub backup_dir: PathBuf,
    pub backup_keep: usize,
    pub max_pets: usize,
    pub tuning: BattleTuning,
    pub catalog_file: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pet_file: PathBuf::from("pets.json"),
            backup_dir: PathBuf::from("backups"),
            backup_keep: 5,
            max_pets: 5,
            tuning: BattleTuning::default(),
            catalog_file: None,
        }
    }
}

impl GameConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!("Failed to read .env file: {}", err);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GameConfig::default();

        if let Some(path) = lookup("PET_FILE") {
            config.pet_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("BACKUP_DIR") {
            config.backup_dir = PathBuf::from(path);
        }
        if let Some(value) = lookup("BACKUP_KEEP") {
            config.backup_keep = parse_number("BACKUP_KEEP", &value)?;
        }
        if let Some(value) = lookup("MAX_PETS") {
            config.max_pets = parse_number("MAX_PETS", &value)?;
        }
        if let Some(path) = lookup("TUNING_FILE") {
            config.tuning = BattleTuning::load(Path::new(&path))?;
        }
        config.catalog_file = lookup("CATALOG_FILE").map(PathBuf::from);

        Ok(config)
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}
