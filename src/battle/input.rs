//! Where move selections come from.
//!
//! The engine asks a `MoveSource` for the acting side's choice once per turn
//! and wraps the call in the move deadline. Sources decide how to prompt and
//! how to handle bad input; the engine only ever sees an index or a timeout.

use crate::battle::state::{BattleEvent, BattleState, Side};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// One selectable entry of the acting side's move pool.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOption {
    pub name: String,
    pub power: u32,
    /// `None` for moves that always land.
    pub accuracy: Option<u8>,
}

/// Everything a source needs to pick a move for the acting side.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub battle_id: String,
    pub turn_number: u32,
    pub side: Side,
    pub owner_id: String,
    pub pet_name: String,
    pub strength: u32,
    pub own_health: f64,
    pub opponent_health: f64,
    pub options: Vec<MoveOption>,
}

impl MoveRequest {
    /// Prompt text listing the options with 1-based numbers.
    pub fn prompt(&self) -> String {
        let mut text = format!(
            "{}, choose a move for {} (health {}):",
            self.owner_id, self.pet_name, self.own_health
        );
        for (i, option) in self.options.iter().enumerate() {
            match option.accuracy {
                Some(accuracy) => text.push_str(&format!(
                    "\n{}. {} (power {}, accuracy {}%)",
                    i + 1,
                    option.name,
                    option.power,
                    accuracy
                )),
                None => text.push_str(&format!("\n{}. {} (power {})", i + 1, option.name, option.power)),
            }
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveChoice {
    /// Zero-based index into the request's options.
    Selected(usize),
    TimedOut,
}

#[async_trait]
pub trait MoveSource: Send {
    async fn request_move(&mut self, request: MoveRequest) -> MoveChoice;

    /// Called after each turn, and at the end of the battle, with the events it produced.
    async fn notify(&mut self, _state: &BattleState, _events: &[BattleEvent]) {}
}

/// Replays a fixed list of choices, then picks the first move forever.
#[derive(Debug, Default)]
pub struct ScriptedMoveSource {
    choices: VecDeque<MoveChoice>,
    pub requests: Vec<MoveRequest>,
    pub notified: Vec<BattleEvent>,
}

impl ScriptedMoveSource {
    pub fn new(choices: Vec<MoveChoice>) -> Self {
        Self {
            choices: choices.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl MoveSource for ScriptedMoveSource {
    async fn request_move(&mut self, request: MoveRequest) -> MoveChoice {
        self.requests.push(request);
        self.choices.pop_front().unwrap_or(MoveChoice::Selected(0))
    }

    async fn notify(&mut self, _state: &BattleState, events: &[BattleEvent]) {
        self.notified.extend_from_slice(events);
    }
}

/// Routes each request to the source owned by the acting side.
pub struct SplitMoveSource {
    side_a: Box<dyn MoveSource>,
    side_b: Box<dyn MoveSource>,
}

impl SplitMoveSource {
    pub fn new(side_a: Box<dyn MoveSource>, side_b: Box<dyn MoveSource>) -> Self {
        Self { side_a, side_b }
    }
}

#[async_trait]
impl MoveSource for SplitMoveSource {
    async fn request_move(&mut self, request: MoveRequest) -> MoveChoice {
        match request.side {
            Side::A => self.side_a.request_move(request).await,
            Side::B => self.side_b.request_move(request).await,
        }
    }

    async fn notify(&mut self, state: &BattleState, events: &[BattleEvent]) {
        self.side_a.notify(state, events).await;
        self.side_b.notify(state, events).await;
    }
}

/// A line of text typed by a user in the battle's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInput {
    pub user_id: String,
    pub text: String,
}

/// Reads selections from a shared text channel.
///
/// Only messages from the acting owner are considered. Text that is not a
/// move number in range gets a feedback line and the source keeps waiting;
/// the engine's deadline still applies to the whole wait.
pub struct ChannelMoveSource {
    inbox: mpsc::Receiver<PlayerInput>,
    outbox: mpsc::UnboundedSender<String>,
}

impl ChannelMoveSource {
    pub fn new(inbox: mpsc::Receiver<PlayerInput>, outbox: mpsc::UnboundedSender<String>) -> Self {
        Self { inbox, outbox }
    }

    fn say(&self, line: String) {
        if self.outbox.send(line).is_err() {
            tracing::debug!("Battle output channel closed");
        }
    }

    /// Parse a 1-based move number into an index into `options`.
    fn parse_selection(text: &str, option_count: usize) -> Option<usize> {
        let number: usize = text.trim().parse().ok()?;
        (1..=option_count).contains(&number).then(|| number - 1)
    }
}

#[async_trait]
impl MoveSource for ChannelMoveSource {
    async fn request_move(&mut self, request: MoveRequest) -> MoveChoice {
        // Anything typed before the prompt belongs to an earlier turn.
        while let Ok(stale) = self.inbox.try_recv() {
            tracing::trace!(user_id = %stale.user_id, "Discarding input sent before the prompt");
        }
        self.say(request.prompt());
        loop {
            let Some(input) = self.inbox.recv().await else {
                tracing::warn!(battle_id = %request.battle_id, "Input channel closed; skipping turn");
                return MoveChoice::TimedOut;
            };
            if input.user_id != request.owner_id {
                tracing::trace!(user_id = %input.user_id, "Ignoring input from non-acting user");
                continue;
            }
            match Self::parse_selection(&input.text, request.options.len()) {
                Some(index) => return MoveChoice::Selected(index),
                None => self.say(format!(
                    "Invalid move! Pick a number from 1 to {}.",
                    request.options.len()
                )),
            }
        }
    }

    async fn notify(&mut self, state: &BattleState, events: &[BattleEvent]) {
        for line in events.iter().filter_map(|event| event.format(state)) {
            self.say(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(owner_id: &str) -> MoveRequest {
        MoveRequest {
            battle_id: "b1".to_string(),
            turn_number: 1,
            side: Side::A,
            owner_id: owner_id.to_string(),
            pet_name: "Crimson Winged Dragon".to_string(),
            strength: 20,
            own_health: 80.0,
            opponent_health: 70.0,
            options: vec![
                MoveOption {
                    name: "Tackle".to_string(),
                    power: 20,
                    accuracy: Some(95),
                },
                MoveOption {
                    name: "DOMAIN EXPANSION".to_string(),
                    power: 40,
                    accuracy: None,
                },
            ],
        }
    }

    #[test]
    fn test_prompt_lists_numbered_options() {
        assert_eq!(
            request("alice").prompt(),
            "alice, choose a move for Crimson Winged Dragon (health 80):\n\
             1. Tackle (power 20, accuracy 95%)\n\
             2. DOMAIN EXPANSION (power 40)"
        );
    }

    #[test]
    fn test_parse_selection_is_one_based() {
        assert_eq!(ChannelMoveSource::parse_selection("1", 2), Some(0));
        assert_eq!(ChannelMoveSource::parse_selection(" 2 ", 2), Some(1));
        assert_eq!(ChannelMoveSource::parse_selection("0", 2), None);
        assert_eq!(ChannelMoveSource::parse_selection("3", 2), None);
        assert_eq!(ChannelMoveSource::parse_selection("tackle", 2), None);
    }

    fn input(user_id: &str, text: &str) -> PlayerInput {
        PlayerInput {
            user_id: user_id.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_channel_source_ignores_others_and_reprompts() {
        let (tx, rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let mut source = ChannelMoveSource::new(rx, out_tx);

        let (choice, ()) = tokio::join!(source.request_move(request("alice")), async {
            let prompt = out_rx.recv().await.unwrap();
            assert!(prompt.starts_with("alice, choose a move"));
            tx.send(input("bob", "1")).await.unwrap();
            tx.send(input("alice", "7")).await.unwrap();
            tx.send(input("alice", "2")).await.unwrap();
        });

        assert_eq!(choice, MoveChoice::Selected(1));
        assert_eq!(
            out_rx.recv().await.unwrap(),
            "Invalid move! Pick a number from 1 to 2."
        );
        assert!(out_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_input_sent_before_the_prompt_is_discarded() {
        let (tx, rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let mut source = ChannelMoveSource::new(rx, out_tx);

        // Typed during the opponent's turn.
        tx.send(input("alice", "1")).await.unwrap();

        let (choice, ()) = tokio::join!(source.request_move(request("alice")), async {
            out_rx.recv().await.unwrap();
            tx.send(input("alice", "2")).await.unwrap();
        });

        assert_eq!(choice, MoveChoice::Selected(1));
    }

    #[tokio::test]
    async fn test_closed_inbox_counts_as_timeout() {
        let (tx, rx) = mpsc::channel(1);
        let (out_tx, _out_rx) = mpsc::unbounded_channel();
        drop(tx);
        let mut source = ChannelMoveSource::new(rx, out_tx);
        assert_eq!(
            source.request_move(request("alice")).await,
            MoveChoice::TimedOut
        );
    }

    #[tokio::test]
    async fn test_split_source_routes_by_side() {
        let mut split = SplitMoveSource::new(
            Box::new(ScriptedMoveSource::new(vec![MoveChoice::Selected(1)])),
            Box::new(ScriptedMoveSource::new(vec![MoveChoice::TimedOut])),
        );
        let mut for_b = request("bob");
        for_b.side = Side::B;

        assert_eq!(split.request_move(for_b).await, MoveChoice::TimedOut);
        assert_eq!(
            split.request_move(request("alice")).await,
            MoveChoice::Selected(1)
        );
    }
}
