use crate::pet::Pet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One of the two combatants. Side A is the challenger and acts first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "Side A"),
            Side::B => write!(f, "Side B"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    NotStarted,
    InProgress,
    Concluded,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No selection arrived before the deadline.
    TimedOut,
    /// The selection did not index into the acting side's pool.
    InvalidSelection { index: usize },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted {
        battle_id: String,
    },
    TurnStarted {
        turn_number: u32,
        side: Side,
    },
    TurnSkipped {
        side: Side,
        reason: SkipReason,
    },
    MoveUsed {
        side: Side,
        move_name: String,
    },
    MoveMissed {
        side: Side,
        move_name: String,
        roll: u8,
    },
    DomainExpansionUnleashed {
        side: Side,
        domain_name: String,
        description: String,
    },
    DamageDealt {
        target: Side,
        damage: f64,
        remaining_health: f64,
    },
    PetFainted {
        side: Side,
    },
    BattleEnded {
        winner: Option<Side>,
        turns: u32,
    },
    ExperienceGained {
        side: Side,
        xp: u32,
    },
    LevelUp {
        side: Side,
        new_level: u32,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, battle_state: &BattleState) -> Option<String> {
        match self {
            BattleEvent::BattleStarted { .. } => {
                let [a, b] = &battle_state.sides;
                Some(format!(
                    "{}'s {} challenges {}'s {}!",
                    a.owner_id, a.pet.name, b.owner_id, b.pet.name
                ))
            }
            BattleEvent::TurnStarted { turn_number, .. } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::TurnSkipped { side, reason } => {
                let pet_name = Self::pet_name(battle_state, *side);
                match reason {
                    SkipReason::TimedOut => {
                        Some(format!("{} waited too long. Turn skipped!", pet_name))
                    }
                    SkipReason::InvalidSelection { .. } => Some(format!(
                        "Invalid selection for {}. Turn skipped!",
                        pet_name
                    )),
                }
            }
            BattleEvent::MoveUsed { side, move_name } => Some(format!(
                "{} used {}!",
                Self::pet_name(battle_state, *side),
                move_name
            )),
            BattleEvent::MoveMissed { side, .. } => Some(format!(
                "{}'s attack missed!",
                Self::pet_name(battle_state, *side)
            )),
            BattleEvent::DomainExpansionUnleashed {
                side, domain_name, ..
            } => Some(format!(
                "{} unleashes DOMAIN EXPANSION: {}!",
                Self::pet_name(battle_state, *side),
                domain_name
            )),
            BattleEvent::DamageDealt { target, damage, .. } => Some(format!(
                "{} took {} damage!",
                Self::pet_name(battle_state, *target),
                Self::format_amount(*damage)
            )),
            BattleEvent::PetFainted { side } => Some(format!(
                "{} fainted!",
                Self::pet_name(battle_state, *side)
            )),
            BattleEvent::BattleEnded { winner, turns } => match winner {
                Some(side) => Some(format!(
                    "{} has won the battle after {} turns!",
                    battle_state.side(*side).owner_id,
                    turns
                )),
                None => Some(format!("The battle ended in a draw after {} turns!", turns)),
            },
            BattleEvent::ExperienceGained { side, xp } => Some(format!(
                "{} gained {} XP.",
                Self::pet_name(battle_state, *side),
                xp
            )),
            BattleEvent::LevelUp { side, new_level } => Some(format!(
                "{} grew to level {}!",
                Self::pet_name(battle_state, *side),
                new_level
            )),
        }
    }

    // --- Private Helper Functions ---

    fn pet_name(battle_state: &BattleState, side: Side) -> &str {
        &battle_state.side(side).pet.name
    }

    fn format_amount(amount: f64) -> String {
        if amount.fract() == 0.0 {
            format!("{}", amount as i64)
        } else {
            format!("{:.1}", amount)
        }
    }
}

/// Event bus for collecting and managing battle events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Human-readable lines for every non-silent event.
    pub fn formatted(&self, battle_state: &BattleState) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(battle_state))
            .collect()
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    /// Format the EventBus for printing. Shows debug format of all events.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Source of accuracy rolls and level-up stat gains for one battle.
///
/// Rolls queued with `new_for_test` or pinned with `fixed` are consumed first;
/// everything else comes from the seeded generator.
#[derive(Debug, Clone)]
pub struct TurnRng {
    rng: StdRng,
    scripted: VecDeque<u8>,
    fixed: Option<u8>,
}

impl TurnRng {
    pub fn new_random() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self {
            scripted: outcomes.into(),
            ..Self::from_seed(0)
        }
    }

    /// Every accuracy roll returns `roll`.
    pub fn fixed(roll: u8) -> Self {
        Self {
            fixed: Some(roll),
            ..Self::from_seed(0)
        }
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            scripted: VecDeque::new(),
            fixed: None,
        }
    }

    /// Uniform roll in [1, 100].
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        let outcome = match self.scripted.pop_front().or(self.fixed) {
            Some(outcome) => outcome,
            None => self.rng.random_range(1..=100),
        };
        tracing::trace!(outcome, reason, "Consumed roll");
        outcome
    }

    /// Generator for non-roll randomness such as level-up stat gains.
    pub fn stat_rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// One combatant inside a battle session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleSide {
    pub owner_id: String,
    pub pet: Pet,
    /// Battle-scoped health; the pet's stored health is untouched until the
    /// battle concludes.
    pub working_health: f64,
    pub moves: Vec<String>,
    pub domain_eligible: bool,
}

impl BattleSide {
    pub fn new(owner_id: &str, pet: Pet, moves: Vec<String>, domain_eligible: bool) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            working_health: pet.health as f64,
            pet,
            moves,
            domain_eligible,
        }
    }

    /// Apply damage, flooring working health at zero. Returns true if the pet fainted.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        self.working_health = (self.working_health - amount.max(0.0)).max(0.0);
        self.is_fainted()
    }

    pub fn is_fainted(&self) -> bool {
        self.working_health <= 0.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub battle_id: String,
    pub sides: [BattleSide; 2],
    /// Turns played so far.
    pub turn_number: u32,
    pub acting: Side,
    pub phase: BattlePhase,
    pub winner: Option<Side>,
}

impl BattleState {
    pub fn new(id: String, side_a: BattleSide, side_b: BattleSide) -> Self {
        Self {
            battle_id: id,
            sides: [side_a, side_b],
            turn_number: 0,
            acting: Side::A,
            phase: BattlePhase::NotStarted,
            winner: None,
        }
    }

    pub fn side(&self, side: Side) -> &BattleSide {
        &self.sides[side.index()]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BattleSide {
        &mut self.sides[side.index()]
    }

    pub fn is_concluded(&self) -> bool {
        self.phase == BattlePhase::Concluded
    }
}
