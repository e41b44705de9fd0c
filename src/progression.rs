use crate::config::{BattleTuning, RewardTuning};
use crate::pet::Pet;
use rand::Rng;
use schema::Rarity;

/// Health gained per level, before capping.
const LEVEL_UP_HEALTH_GAIN: std::ops::RangeInclusive<u32> = 5..=10;
/// Strength gained per level, before capping.
const LEVEL_UP_STRENGTH_GAIN: std::ops::RangeInclusive<u32> = 2..=5;

/// One level gained during `add_experience`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: u32,
    pub health_gain: u32,
    pub strength_gain: u32,
}

/// Add `xp_gained` to `pet`, levelling up as many times as the accumulated
/// XP allows. The threshold for each level is `level * xp_per_level`; the
/// threshold is subtracted on every level-up and the remainder carried.
/// At `max_level` the loop stops and leftover XP is kept as-is.
pub fn add_experience<R: Rng + ?Sized>(
    pet: &mut Pet,
    xp_gained: u32,
    tuning: &BattleTuning,
    rng: &mut R,
) -> Vec<LevelUp> {
    let mut gained = Vec::new();
    pet.xp = pet.xp.saturating_add(xp_gained);

    while pet.level < tuning.max_level && pet.xp >= pet.xp_needed(tuning.xp_per_level) {
        pet.xp -= pet.xp_needed(tuning.xp_per_level);
        pet.level += 1;

        let old_health = pet.health;
        let old_strength = pet.strength;
        pet.health = (pet.health + rng.random_range(LEVEL_UP_HEALTH_GAIN)).min(tuning.max_health);
        pet.strength =
            (pet.strength + rng.random_range(LEVEL_UP_STRENGTH_GAIN)).min(tuning.max_strength);

        tracing::debug!(pet = %pet.name, level = pet.level, "Level up");
        gained.push(LevelUp {
            new_level: pet.level,
            health_gain: pet.health.saturating_sub(old_health),
            strength_gain: pet.strength.saturating_sub(old_strength),
        });
    }

    gained
}

/// Coins for beating `loser_pet` with `winner_pet`: a flat base, a bonus per
/// level the loser was above the winner, and a bonus for the loser's rarity.
pub fn calculate_reward(winner_pet: &Pet, loser_pet: &Pet, reward: &RewardTuning) -> u32 {
    let level_bonus = loser_pet
        .level
        .saturating_sub(winner_pet.level)
        .saturating_mul(reward.per_level_bonus);
    let rarity_bonus = match loser_pet.rarity {
        Rarity::Common => 0,
        Rarity::Rare => reward.rare_bonus,
        Rarity::Mythic => reward.mythic_bonus,
    };
    reward.base + level_bonus + rarity_bonus
}
