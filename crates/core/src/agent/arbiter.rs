//! Utility-based goal arbitration.
//!
//! Every tick each candidate goal is scored independently from the tick's snapshot and
//! the highest score wins. Candidates are evaluated in a fixed order and only a strictly
//! greater score replaces the current best, so earlier goals win ties. When nothing
//! scores above zero the agent idles.

use crate::types::{EntityRef, GoalType, NextObjective, Screen};

pub const COMBAT_SCORE: f64 = 0.85;
pub const HEAL_CRITICAL_SCORE: f64 = 0.9;
pub const HEAL_LOW_SCORE: f64 = 0.6;
pub const MAIN_QUEST_SCORE: f64 = 0.7;
pub const SIDE_QUEST_SCORE: f64 = 0.3;
pub const EXPLORE_SCORE: f64 = 0.4;
pub const NAVIGATE_SCORE: f64 = 0.5;
pub const INTERACT_SCORE: f64 = 0.65;

pub const HEAL_CRITICAL_RATIO: f64 = 0.3;
pub const HEAL_LOW_RATIO: f64 = 0.5;

/// A chosen goal together with whatever the dispatcher needs to execute it.
#[derive(Clone, Debug, PartialEq)]
pub enum Goal<'a> {
    Idle,
    Navigate,
    Explore,
    Interact(EntityRef),
    Combat,
    Quest(NextObjective<'a>),
    Heal,
}

impl Goal<'_> {
    pub fn kind(&self) -> GoalType {
        match self {
            Goal::Idle => GoalType::Idle,
            Goal::Navigate => GoalType::Navigate,
            Goal::Explore => GoalType::Explore,
            Goal::Interact(_) => GoalType::Interact,
            Goal::Combat => GoalType::Combat,
            Goal::Quest(_) => GoalType::Quest,
            Goal::Heal => GoalType::Heal,
        }
    }
}

/// Everything the arbiter reads, captured once at the start of a tick.
#[derive(Clone, Debug, Default)]
pub struct GoalInputs<'a> {
    pub screen: Screen,
    pub has_combat_state: bool,
    pub hp_ratio: Option<f64>,
    /// Objective the dispatcher would pursue under the current strategy.
    pub quest: Option<NextObjective<'a>>,
    pub main_quest_available: bool,
    pub explore_all_areas: bool,
    pub has_active_path: bool,
    pub interactable: Option<EntityRef>,
}

/// Scored candidates in evaluation order.
pub fn score_candidates<'a>(inputs: &GoalInputs<'a>) -> Vec<(Goal<'a>, f64)> {
    let mut candidates = Vec::new();

    if inputs.screen == Screen::Combat && inputs.has_combat_state {
        candidates.push((Goal::Combat, COMBAT_SCORE));
    }
    match inputs.hp_ratio {
        Some(ratio) if ratio < HEAL_CRITICAL_RATIO => {
            candidates.push((Goal::Heal, HEAL_CRITICAL_SCORE));
        }
        Some(ratio) if ratio < HEAL_LOW_RATIO => candidates.push((Goal::Heal, HEAL_LOW_SCORE)),
        _ => {}
    }
    if let Some(next) = &inputs.quest {
        let score = if inputs.main_quest_available { MAIN_QUEST_SCORE } else { SIDE_QUEST_SCORE };
        candidates.push((Goal::Quest(next.clone()), score));
    }
    if inputs.explore_all_areas {
        candidates.push((Goal::Explore, EXPLORE_SCORE));
    }
    if inputs.has_active_path {
        candidates.push((Goal::Navigate, NAVIGATE_SCORE));
    }
    if let Some(entity) = inputs.interactable {
        candidates.push((Goal::Interact(entity), INTERACT_SCORE));
    }

    candidates
}

pub fn evaluate_goals<'a>(inputs: &GoalInputs<'a>) -> Goal<'a> {
    let mut best = Goal::Idle;
    let mut best_score = 0.0;

    for (goal, score) in score_candidates(inputs) {
        tracing::debug!(goal = ?goal.kind(), score, "goal candidate");
        if score > best_score {
            best = goal;
            best_score = score;
        }
    }

    tracing::debug!(goal = ?best.kind(), score = best_score, "goal selected");
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::*;
    use crate::types::QuestChain;

    fn main_chain() -> Vec<QuestChain> {
        vec![chain("main", true, &[], &[(3, 3)])]
    }

    fn quest_inputs(chains: &[QuestChain]) -> GoalInputs<'_> {
        let chain = &chains[0];
        GoalInputs {
            quest: Some(NextObjective {
                quest_id: &chain.id,
                objective: &chain.objectives[0],
                is_main_quest: chain.is_main_quest,
            }),
            main_quest_available: chain.is_main_quest,
            ..GoalInputs::default()
        }
    }

    #[test]
    fn nothing_scored_means_idle() {
        assert_eq!(evaluate_goals(&GoalInputs::default()), Goal::Idle);
    }

    #[test]
    fn critical_health_beats_main_quest() {
        let chains = main_chain();
        let inputs = GoalInputs { hp_ratio: Some(0.2), ..quest_inputs(&chains) };
        assert_eq!(evaluate_goals(&inputs), Goal::Heal);
    }

    #[test]
    fn main_quest_beats_interactable_when_healthy() {
        let chains = main_chain();
        let inputs = GoalInputs {
            hp_ratio: Some(0.6),
            interactable: Some(EntityRef(7)),
            ..quest_inputs(&chains)
        };
        assert_eq!(evaluate_goals(&inputs).kind(), GoalType::Quest);
    }

    #[test]
    fn low_health_loses_to_combat_but_critical_health_wins() {
        let inputs = GoalInputs {
            screen: Screen::Combat,
            has_combat_state: true,
            hp_ratio: Some(0.4),
            ..GoalInputs::default()
        };
        assert_eq!(evaluate_goals(&inputs), Goal::Combat);

        let inputs = GoalInputs { hp_ratio: Some(0.29), ..inputs };
        assert_eq!(evaluate_goals(&inputs), Goal::Heal);
    }

    #[test]
    fn combat_requires_both_screen_and_snapshot() {
        let inputs = GoalInputs { screen: Screen::Combat, ..GoalInputs::default() };
        assert_eq!(evaluate_goals(&inputs), Goal::Idle);
        let inputs = GoalInputs { has_combat_state: true, ..GoalInputs::default() };
        assert_eq!(evaluate_goals(&inputs), Goal::Idle);
    }

    #[test]
    fn active_path_outranks_exploration_and_side_quest() {
        let mut chains = main_chain();
        chains[0].is_main_quest = false;
        let inputs = GoalInputs {
            explore_all_areas: true,
            has_active_path: true,
            ..quest_inputs(&chains)
        };
        assert_eq!(evaluate_goals(&inputs), Goal::Navigate);

        let inputs = GoalInputs { has_active_path: false, ..inputs };
        assert_eq!(evaluate_goals(&inputs), Goal::Explore);
    }

    #[test]
    fn candidates_are_listed_in_evaluation_order() {
        let chains = main_chain();
        let inputs = GoalInputs {
            screen: Screen::Combat,
            has_combat_state: true,
            hp_ratio: Some(0.45),
            explore_all_areas: true,
            has_active_path: true,
            interactable: Some(EntityRef(1)),
            ..quest_inputs(&chains)
        };
        let kinds: Vec<GoalType> =
            score_candidates(&inputs).iter().map(|(goal, _)| goal.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                GoalType::Combat,
                GoalType::Heal,
                GoalType::Quest,
                GoalType::Explore,
                GoalType::Navigate,
                GoalType::Interact,
            ]
        );
    }
}
