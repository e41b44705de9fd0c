//! A module for defining AI behaviors for battle opponents.

use crate::battle::calculators::{domain_damage, move_damage};
use crate::battle::input::{MoveChoice, MoveOption, MoveRequest, MoveSource};
use async_trait::async_trait;
use ordered_float::OrderedFloat;

/// Added to a move's score when a hit would knock the opponent out.
const KNOCKOUT_BONUS: f64 = 50.0;

/// A trait for any system that can decide on a move.
/// This provides a common interface for different AI difficulties or strategies.
pub trait Behavior: Send + Sync {
    /// Inspects the request and decides on the next move for the acting side.
    fn decide_move(&self, request: &MoveRequest) -> MoveChoice;
}

/// Picks the move with the best expected damage, favouring likely knockouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringAI;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    fn score_move(&self, option: &MoveOption, request: &MoveRequest) -> f64 {
        let (damage, hit_chance) = match option.accuracy {
            Some(accuracy) => (
                move_damage(option.power, request.strength),
                accuracy as f64 / 100.0,
            ),
            None => (domain_damage(option.power, request.strength), 1.0),
        };

        // Damage past the opponent's remaining health is wasted.
        let mut score = damage.min(request.opponent_health) * hit_chance;
        if damage >= request.opponent_health {
            score += KNOCKOUT_BONUS * hit_chance;
        }
        score
    }
}

impl Behavior for ScoringAI {
    fn decide_move(&self, request: &MoveRequest) -> MoveChoice {
        request
            .options
            .iter()
            .enumerate()
            .max_by_key(|(_, option)| OrderedFloat(self.score_move(option, request)))
            .map_or(MoveChoice::TimedOut, |(index, _)| MoveChoice::Selected(index))
    }
}

/// Lets any `Behavior` stand in as a move source, answering immediately.
pub struct AiMoveSource<B: Behavior> {
    behavior: B,
}

impl<B: Behavior> AiMoveSource<B> {
    pub fn new(behavior: B) -> Self {
        Self { behavior }
    }
}

#[async_trait]
impl<B: Behavior> MoveSource for AiMoveSource<B> {
    async fn request_move(&mut self, request: MoveRequest) -> MoveChoice {
        let choice = self.behavior.decide_move(&request);
        tracing::trace!(owner_id = %request.owner_id, ?choice, "AI selected move");
        choice
    }
}
