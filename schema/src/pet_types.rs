use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// The fixed species catalog. A pet's species picks its domain expansion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum Species {
    Dragon,
    Cactus,
    Toaster,
    Penguin,
    Cloud,
    Robot,
    Phoenix,
    Jellyfish,
    Unicorn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Mythic,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Mythic => "Mythic",
        };
        write!(f, "{}", display_name)
    }
}

/// Colors used as the first word of a generated pet name.
pub const COLORS: [&str; 9] = [
    "Crimson", "Neon", "Golden", "Icy", "Shadow", "Rainbow", "Emerald", "Azure", "Violet",
];

/// Traits used as the second word of a generated pet name.
pub const TRAITS: [&str; 9] = [
    "Winged", "Singing", "Glowy", "Spiky", "Fluffy", "Invisible", "Psychic", "Metallic", "Mystic",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_species_round_trips_through_display() {
        for species in Species::iter() {
            let parsed = Species::from_str(&species.to_string()).unwrap();
            assert_eq!(parsed, species);
        }
        assert_eq!(Species::iter().count(), 9);
    }

    #[test]
    fn test_rarity_display_is_capitalized() {
        assert_eq!(Rarity::Common.to_string(), "Common");
        assert_eq!(Rarity::Mythic.to_string(), "Mythic");
        assert_eq!(Rarity::default(), Rarity::Common);
    }
}
