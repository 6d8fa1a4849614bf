//! Turn-based combat action selection per configured combat style.
//! Selection is pure: the same snapshot, actor and style always yield the same action.

use crate::types::{ActorId, CombatAction, CombatState, CombatStyle, Combatant, Side, Skill, Tuning};

pub fn select_action(
    state: &CombatState,
    actor_id: ActorId,
    style: CombatStyle,
    tuning: &Tuning,
) -> CombatAction {
    let Some(actor) = state.combatant(actor_id).filter(|actor| actor.is_alive()) else {
        return CombatAction::Defend;
    };
    let Some(target) = weakest_opponent(state, actor.side) else {
        return CombatAction::Defend;
    };

    match style {
        CombatStyle::Aggressive => CombatAction::Attack { target },
        CombatStyle::Defensive => {
            if actor.hp_ratio() < tuning.defend_hp_ratio {
                CombatAction::Defend
            } else {
                CombatAction::Attack { target }
            }
        }
        CombatStyle::Balanced => {
            if actor.hp_ratio() < tuning.item_hp_ratio && actor.potions > 0 {
                return CombatAction::Item { target: actor.id };
            }
            match best_skill(actor) {
                Some(skill) if skill.power > actor.attack => {
                    CombatAction::Skill { skill: skill.name.clone(), target }
                }
                _ => CombatAction::Attack { target },
            }
        }
    }
}

/// Living opponent with the lowest current HP; ties go to the lowest id.
fn weakest_opponent(state: &CombatState, side: Side) -> Option<ActorId> {
    state
        .combatants
        .iter()
        .filter(|other| other.side != side && other.is_alive())
        .min_by_key(|other| (other.hp, other.id))
        .map(|other| other.id)
}

/// Strongest affordable skill; the first declared wins ties.
fn best_skill(actor: &Combatant) -> Option<&Skill> {
    actor.skills.iter().filter(|skill| skill.mana_cost <= actor.mana).fold(None, |best, skill| {
        match best {
            Some(current) if current.power >= skill.power => Some(current),
            _ => Some(skill),
        }
    })
}
