use crate::battle::calculators::calculate_attack_outcome;
use crate::battle::commands::execute_command_batch;
use crate::battle::input::{MoveChoice, MoveOption, MoveRequest, MoveSource};
use crate::battle::state::{
    BattleEvent, BattlePhase, BattleSide, BattleState, EventBus, Side, SkipReason, TurnRng,
};
use crate::config::BattleTuning;
use crate::cooldown::DomainCooldowns;
use crate::errors::{ActionError, BattleStateError, EngineResult};
use crate::moves::MoveCatalog;
use crate::pet::Pet;
use crate::progression::add_experience;
use schema::DOMAIN_EXPANSION_MOVE;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a finished battle.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleResult {
    pub battle_id: String,
    /// `None` when the turn cap was reached.
    pub winner: Option<Side>,
    pub turns: u32,
    /// Final pets for side A and side B, with health and experience applied.
    pub pets: [Pet; 2],
    pub events: Vec<BattleEvent>,
}

impl BattleResult {
    pub fn pet(&self, side: Side) -> &Pet {
        &self.pets[side.index()]
    }

    pub fn loser(&self) -> Option<Side> {
        self.winner.map(Side::opponent)
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Runs battles between two pets.
///
/// The engine can be stepped by hand (`create_battle`, `begin`,
/// `apply_choice`) or driven end to end by `start_battle`, which asks a
/// `MoveSource` for each turn under the move deadline.
#[derive(Debug, Clone)]
pub struct BattleEngine {
    catalog: Arc<MoveCatalog>,
    cooldowns: Arc<DomainCooldowns>,
    tuning: BattleTuning,
}

impl BattleEngine {
    pub fn new(catalog: Arc<MoveCatalog>, cooldowns: Arc<DomainCooldowns>, tuning: BattleTuning) -> Self {
        Self {
            catalog,
            cooldowns,
            tuning,
        }
    }

    pub fn catalog(&self) -> &MoveCatalog {
        &self.catalog
    }

    pub fn cooldowns(&self) -> &DomainCooldowns {
        &self.cooldowns
    }

    pub fn tuning(&self) -> &BattleTuning {
        &self.tuning
    }

    /// Build the battle-scoped view of one pet: its level's move pool, plus
    /// domain expansion when the pet is eligible right now and its species
    /// has one.
    pub fn prepare_side(&self, owner_id: &str, pet: Pet) -> BattleSide {
        let mut moves = self.catalog.move_pool(pet.level);
        let domain_eligible = self.cooldowns.can_use_domain_expansion(owner_id, &pet)
            && self.catalog.domain_expansion(pet.species).is_some();
        if domain_eligible {
            moves.push(DOMAIN_EXPANSION_MOVE.to_string());
        }
        BattleSide::new(owner_id, pet, moves, domain_eligible)
    }

    pub fn create_battle(&self, pet1: Pet, owner1: &str, pet2: Pet, owner2: &str) -> BattleState {
        let battle_id = format!(
            "{}-vs-{}-{}",
            owner1,
            owner2,
            self.cooldowns.now().timestamp_millis()
        );
        BattleState::new(
            battle_id,
            self.prepare_side(owner1, pet1),
            self.prepare_side(owner2, pet2),
        )
    }

    pub fn begin(&self, state: &mut BattleState, bus: &mut EventBus) -> EngineResult<()> {
        match state.phase {
            BattlePhase::NotStarted => {}
            BattlePhase::InProgress => return Err(BattleStateError::AlreadyStarted.into()),
            BattlePhase::Concluded => return Err(BattleStateError::AlreadyConcluded.into()),
        }
        state.phase = BattlePhase::InProgress;
        state.acting = Side::A;
        bus.push(BattleEvent::BattleStarted {
            battle_id: state.battle_id.clone(),
        });
        Ok(())
    }

    /// The request handed to the move source for the acting side.
    pub fn move_request(&self, state: &BattleState) -> EngineResult<MoveRequest> {
        let acting = state.side(state.acting);
        let options = acting
            .moves
            .iter()
            .map(|name| self.describe_move(acting, name))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(MoveRequest {
            battle_id: state.battle_id.clone(),
            turn_number: state.turn_number + 1,
            side: state.acting,
            owner_id: acting.owner_id.clone(),
            pet_name: acting.pet.name.clone(),
            strength: acting.pet.strength,
            own_health: acting.working_health,
            opponent_health: state.side(state.acting.opponent()).working_health,
            options,
        })
    }

    fn describe_move(&self, side: &BattleSide, name: &str) -> EngineResult<MoveOption> {
        if name == DOMAIN_EXPANSION_MOVE {
            let power = self
                .catalog
                .domain_expansion(side.pet.species)
                .map_or(0, |domain| domain.power);
            return Ok(MoveOption {
                name: name.to_string(),
                power,
                accuracy: None,
            });
        }
        let data = self.catalog.get_move_data(name)?;
        Ok(MoveOption {
            name: data.name.clone(),
            power: data.power,
            accuracy: Some(data.accuracy),
        })
    }

    /// Check a selection against the acting side's pool without touching state.
    pub fn validate_selection(&self, state: &BattleState, index: usize) -> Result<String, ActionError> {
        let moves = &state.side(state.acting).moves;
        moves
            .get(index)
            .cloned()
            .ok_or(ActionError::InvalidMoveIndex {
                index,
                pool_size: moves.len(),
            })
    }

    /// Play one turn for the acting side.
    ///
    /// A timeout or an out-of-range selection skips the turn; the turn still
    /// counts and the other side acts next.
    pub fn apply_choice(
        &self,
        state: &mut BattleState,
        choice: MoveChoice,
        rng: &mut TurnRng,
        bus: &mut EventBus,
    ) -> EngineResult<()> {
        match state.phase {
            BattlePhase::InProgress => {}
            BattlePhase::NotStarted => return Err(BattleStateError::NotStarted.into()),
            BattlePhase::Concluded => return Err(BattleStateError::AlreadyConcluded.into()),
        }

        let side = state.acting;
        state.turn_number += 1;
        bus.push(BattleEvent::TurnStarted {
            turn_number: state.turn_number,
            side,
        });

        match choice {
            MoveChoice::TimedOut => {
                tracing::debug!(battle_id = %state.battle_id, %side, "Move selection timed out");
                bus.push(BattleEvent::TurnSkipped {
                    side,
                    reason: SkipReason::TimedOut,
                });
            }
            MoveChoice::Selected(index) => match self.validate_selection(state, index) {
                Ok(move_name) => {
                    let commands = calculate_attack_outcome(state, &self.catalog, side, &move_name, rng)?;
                    execute_command_batch(commands, state, bus, &self.cooldowns);
                }
                Err(err) => {
                    tracing::warn!(battle_id = %state.battle_id, %side, error = %err, "Rejected move selection");
                    bus.push(BattleEvent::TurnSkipped {
                        side,
                        reason: SkipReason::InvalidSelection { index },
                    });
                }
            },
        }

        if state.side(side.opponent()).is_fainted() {
            self.conclude(state, Some(side), rng, bus);
        } else if state.side(side).is_fainted() {
            self.conclude(state, Some(side.opponent()), rng, bus);
        } else if state.turn_number >= self.tuning.max_turns {
            tracing::info!(battle_id = %state.battle_id, turns = state.turn_number, "Turn cap reached");
            self.conclude(state, None, rng, bus);
        } else {
            state.acting = side.opponent();
        }
        Ok(())
    }

    /// Write working health back to the pets and award experience.
    fn conclude(&self, state: &mut BattleState, winner: Option<Side>, rng: &mut TurnRng, bus: &mut EventBus) {
        state.phase = BattlePhase::Concluded;
        state.winner = winner;
        bus.push(BattleEvent::BattleEnded {
            winner,
            turns: state.turn_number,
        });

        for side in [Side::A, Side::B] {
            let xp = if winner == Some(side) {
                self.tuning.winner_xp
            } else {
                self.tuning.loser_xp
            };
            let battle_side = state.side_mut(side);
            battle_side.pet.health = (battle_side.working_health.floor() as u32).max(1);
            bus.push(BattleEvent::ExperienceGained { side, xp });

            let gained = add_experience(&mut battle_side.pet, xp, &self.tuning, rng.stat_rng());
            for level_up in gained {
                bus.push(BattleEvent::LevelUp {
                    side,
                    new_level: level_up.new_level,
                });
            }
        }
    }

    /// Run a battle to completion.
    ///
    /// Side A (`pet1`, `owner1`) acts first. Each selection is awaited for at
    /// most the configured move timeout; events are passed to
    /// `source.notify` after every turn.
    pub async fn start_battle(
        &self,
        pet1: Pet,
        owner1: &str,
        pet2: Pet,
        owner2: &str,
        source: &mut dyn MoveSource,
        rng: &mut TurnRng,
    ) -> EngineResult<BattleResult> {
        let mut state = self.create_battle(pet1, owner1, pet2, owner2);
        let mut bus = EventBus::new();
        self.begin(&mut state, &mut bus)?;
        tracing::info!(battle_id = %state.battle_id, owner1, owner2, "Battle started");

        let mut reported = 0;
        while !state.is_concluded() {
            let request = self.move_request(&state)?;
            let choice =
                match tokio::time::timeout(self.tuning.move_timeout(), source.request_move(request)).await {
                    Ok(choice) => choice,
                    Err(_) => MoveChoice::TimedOut,
                };
            self.apply_choice(&mut state, choice, rng, &mut bus)?;

            source.notify(&state, &bus.events()[reported..]).await;
            reported = bus.len();
        }

        tracing::info!(
            battle_id = %state.battle_id,
            winner = ?state.winner,
            turns = state.turn_number,
            "Battle concluded"
        );
        let [side_a, side_b] = state.sides;
        Ok(BattleResult {
            battle_id: state.battle_id,
            winner: state.winner,
            turns: state.turn_number,
            pets: [side_a.pet, side_b.pet],
            events: bus.into_events(),
        })
    }
}
