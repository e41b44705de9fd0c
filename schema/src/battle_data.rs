use crate::Species;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pool entry name of the species-specific special move.
pub const DOMAIN_EXPANSION_MOVE: &str = "DOMAIN EXPANSION";

/// A static move catalog entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MoveData {
    pub name: String,
    pub power: u32,
    /// Hit chance in percent, 0-100. A roll in [1, 100] hits iff roll <= accuracy.
    pub accuracy: u8,
}

impl MoveData {
    pub fn new(name: &str, power: u32, accuracy: u8) -> Self {
        Self {
            name: name.to_string(),
            power,
            accuracy,
        }
    }
}

impl fmt::Display for MoveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Power: {}, Accuracy: {}%)",
            self.name, self.power, self.accuracy
        )
    }
}

/// Moves that unlock together once a pet reaches `unlock_level`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MoveTier {
    pub unlock_level: u32,
    pub moves: Vec<MoveData>,
}

/// Special move for mythic pets of one species.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DomainExpansion {
    pub species: Species,
    pub name: String,
    pub power: u32,
    pub description: String,
}
