//! NPC-versus-NPC demo battle against the JSON pet store.
//!
//! Usage: `pet-battler [seed]`. Settings come from the environment (and
//! `.env`); see `GameConfig`.

use anyhow::Context;
use async_trait::async_trait;
use pet_battler::battle::input::{MoveChoice, MoveRequest, MoveSource};
use pet_battler::clock::SystemClock;
use pet_battler::{
    AiMoveSource, Arena, BattleEngine, BattleEvent, BattleState, DomainCooldowns, GameConfig,
    JsonFileStore, MoveCatalog, Pet, PetStore, Rarity, ScoringAI, TurnRng,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NPC_RED: &str = "npc-red";
const NPC_BLUE: &str = "npc-blue";

/// AI-driven source that prints the battle as it happens.
struct Narrator {
    ai: AiMoveSource<ScoringAI>,
}

#[async_trait]
impl MoveSource for Narrator {
    async fn request_move(&mut self, request: MoveRequest) -> MoveChoice {
        self.ai.request_move(request).await
    }

    async fn notify(&mut self, state: &BattleState, events: &[BattleEvent]) {
        for line in events.iter().filter_map(|event| event.format(state)) {
            println!("{}", line);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pet_battler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GameConfig::from_env().context("loading configuration")?;
    let catalog = match &config.catalog_file {
        Some(path) => MoveCatalog::load(path)
            .with_context(|| format!("loading move catalog {}", path.display()))?,
        None => MoveCatalog::standard(),
    };

    let seed = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()
        .context("seed must be a non-negative integer")?;
    let mut rng = match seed {
        Some(seed) => TurnRng::from_seed(seed),
        None => TurnRng::new_random(),
    };

    let store = Arc::new(
        JsonFileStore::from_config(&config)
            .await
            .with_context(|| format!("opening {}", config.pet_file.display()))?,
    );
    let mut pet_rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_os_rng(),
    };
    for npc in [NPC_RED, NPC_BLUE] {
        let mut roster = store.get_pets(npc).await?;
        if roster.is_empty() && config.max_pets > 0 {
            let pet = Pet::generate(Rarity::Common, &mut pet_rng);
            tracing::info!(owner = npc, pet = %pet.name, "Adopted starter pet");
            roster.push(pet);
            store.set_pets(npc, roster).await?;
        }
    }

    let cooldowns = Arc::new(DomainCooldowns::new(
        Arc::new(SystemClock),
        config.tuning.domain_cooldown(),
    ));
    let engine = BattleEngine::new(Arc::new(catalog), cooldowns, config.tuning.clone());
    let arena = Arena::new(engine, store.clone(), store.clone());

    let mut narrator = Narrator {
        ai: AiMoveSource::new(ScoringAI::new()),
    };
    let outcome = arena
        .fight(NPC_RED, 0, NPC_BLUE, 0, &mut narrator, &mut rng)
        .await?;

    match outcome.winner_id() {
        Some(winner) => println!(
            "{} earns {} coins (balance {}).",
            winner,
            outcome.reward,
            outcome.winner_balance.unwrap_or_default()
        ),
        None => println!("No coins awarded for a draw."),
    }
    for pet in &outcome.result.pets {
        println!("{}", pet);
    }
    Ok(())
}
