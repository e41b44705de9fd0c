use crate::battle::state::{BattleEvent, BattleState, EventBus, Side};
use crate::cooldown::DomainCooldowns;
use schema::DOMAIN_EXPANSION_MOVE;

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    DealDamage { target: Side, amount: f64 },
    /// Stamp the acting side's domain expansion cooldown with the current time.
    StartDomainCooldown { side: Side },
    EmitEvent(BattleEvent),
}

/// Execute a batch of commands in order
pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    state: &mut BattleState,
    bus: &mut EventBus,
    cooldowns: &DomainCooldowns,
) {
    for command in commands {
        execute_command(command, state, bus, cooldowns);
    }
}

pub fn execute_command(
    command: BattleCommand,
    state: &mut BattleState,
    bus: &mut EventBus,
    cooldowns: &DomainCooldowns,
) {
    match command {
        BattleCommand::EmitEvent(event) => bus.push(event),
        BattleCommand::DealDamage { target, amount } => {
            execute_deal_damage_command(target, amount, state, bus)
        }
        BattleCommand::StartDomainCooldown { side } => {
            let battle_side = state.side_mut(side);
            // Once per battle as well: drop it from the pool.
            battle_side.domain_eligible = false;
            battle_side.moves.retain(|name| name != DOMAIN_EXPANSION_MOVE);
            cooldowns.record_use(&battle_side.owner_id, &battle_side.pet.name);
        }
    }
}

fn execute_deal_damage_command(target: Side, amount: f64, state: &mut BattleState, bus: &mut EventBus) {
    let side = state.side_mut(target);
    let did_faint = side.take_damage(amount);

    bus.push(BattleEvent::DamageDealt {
        target,
        damage: amount,
        remaining_health: side.working_health,
    });

    if did_faint {
        bus.push(BattleEvent::PetFainted { side: target });
    }
}
