use crate::battle::commands::BattleCommand;
use crate::battle::state::{BattleEvent, BattleState, Side, TurnRng};
use crate::errors::MoveDataResult;
use crate::moves::MoveCatalog;
use schema::DOMAIN_EXPANSION_MOVE;

/// Strength is measured against this divisor when scaling move power.
pub const STRENGTH_DIVISOR: f64 = 20.0;

/// A roll in [1, 100] hits when it does not exceed the move's accuracy.
pub fn move_hits(accuracy: u8, roll: u8) -> bool {
    roll <= accuracy
}

/// Damage of a landed normal move, truncated to a whole number.
pub fn move_damage(power: u32, strength: u32) -> f64 {
    (power as f64 * (strength as f64 / STRENGTH_DIVISOR)).floor()
}

/// Domain expansion damage. Never rounded.
pub fn domain_damage(power: u32, strength: u32) -> f64 {
    power as f64 * (strength as f64 / STRENGTH_DIVISOR)
}

/// Resolve `move_name` used by `attacker` into the commands that apply it.
///
/// Normal moves consume one accuracy roll. Domain expansion always lands and
/// starts the cooldown; a side that is not eligible, or a species without a
/// catalog entry, deals nothing.
pub fn calculate_attack_outcome(
    state: &BattleState,
    catalog: &MoveCatalog,
    attacker: Side,
    move_name: &str,
    rng: &mut TurnRng,
) -> MoveDataResult<Vec<BattleCommand>> {
    let mut commands = Vec::new();
    let defender = attacker.opponent();
    let acting = state.side(attacker);

    if move_name == DOMAIN_EXPANSION_MOVE {
        if !acting.domain_eligible {
            return Ok(commands);
        }
        let Some(domain) = catalog.domain_expansion(acting.pet.species) else {
            return Ok(commands);
        };
        commands.push(BattleCommand::EmitEvent(BattleEvent::DomainExpansionUnleashed {
            side: attacker,
            domain_name: domain.name.clone(),
            description: domain.description.clone(),
        }));
        commands.push(BattleCommand::DealDamage {
            target: defender,
            amount: domain_damage(domain.power, acting.pet.strength),
        });
        commands.push(BattleCommand::StartDomainCooldown { side: attacker });
        return Ok(commands);
    }

    let move_data = catalog.get_move_data(move_name)?;
    commands.push(BattleCommand::EmitEvent(BattleEvent::MoveUsed {
        side: attacker,
        move_name: move_data.name.clone(),
    }));

    let roll = rng.next_outcome("Accuracy Check");
    if move_hits(move_data.accuracy, roll) {
        commands.push(BattleCommand::DealDamage {
            target: defender,
            amount: move_damage(move_data.power, acting.pet.strength),
        });
    } else {
        commands.push(BattleCommand::EmitEvent(BattleEvent::MoveMissed {
            side: attacker,
            move_name: move_data.name.clone(),
            roll,
        }));
    }

    Ok(commands)
}
