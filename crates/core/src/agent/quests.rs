//! Quest-chain dependency gating and next-objective selection.
//! The resolver only reads the tracker; quest progress is owned by the host.

use crate::types::{NextObjective, Objective, QuestChain, QuestId, QuestStatus, QuestTracker};

pub fn quest_status(tracker: &QuestTracker, id: &QuestId) -> QuestStatus {
    tracker.get(id).map(|state| state.status).unwrap_or_default()
}

/// Next objective to path toward, or `None` when no chain is eligible.
///
/// A chain is eligible when it is not completed, every dependency is completed, and
/// it still has an objective left. With `prioritize_main` the first eligible main
/// chain wins; otherwise (or when no main chain is eligible) declaration order decides.
pub fn next_objective<'a>(
    tracker: &QuestTracker,
    chains: &'a [QuestChain],
    prioritize_main: bool,
) -> Option<NextObjective<'a>> {
    let mut eligible = chains.iter().filter_map(|chain| {
        pending_objective(tracker, chain).map(|objective| NextObjective {
            quest_id: &chain.id,
            objective,
            is_main_quest: chain.is_main_quest,
        })
    });

    if prioritize_main {
        let mut first = None;
        for candidate in eligible.by_ref() {
            if candidate.is_main_quest {
                return Some(candidate);
            }
            if first.is_none() {
                first = Some(candidate);
            }
        }
        return first;
    }
    eligible.next()
}

fn pending_objective<'a>(tracker: &QuestTracker, chain: &'a QuestChain) -> Option<&'a Objective> {
    let state = tracker.get(&chain.id).copied().unwrap_or_default();
    if state.status == QuestStatus::Completed {
        return None;
    }
    let unlocked = chain
        .dependencies
        .iter()
        .all(|dependency| quest_status(tracker, dependency) == QuestStatus::Completed);
    if !unlocked {
        return None;
    }
    chain.objectives.get(state.objective_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_support::*;
    use crate::types::QuestState;

    #[test]
    fn incomplete_dependency_gates_main_quest() {
        let chains = vec![
            chain("prologue", false, &[], &[(2, 2)]),
            chain("finale", true, &["prologue"], &[(5, 5)]),
        ];
        let mut tracker = QuestTracker::new();
        tracker.insert("prologue".into(), started(0));

        let next = next_objective(&tracker, &chains, true).expect("side chain is eligible");
        assert_eq!(next.quest_id.0, "prologue");
        assert!(!next.is_main_quest);

        let completed = QuestState { status: QuestStatus::Completed, objective_index: 1 };
        tracker.insert("prologue".into(), completed);
        let next = next_objective(&tracker, &chains, true).expect("finale unlocked");
        assert_eq!(next.quest_id.0, "finale");
        assert_eq!(next.objective.target().x, 5);
    }

    #[test]
    fn main_priority_only_applies_when_flag_is_set() {
        let chains = vec![
            chain("herbs", false, &[], &[(1, 1)]),
            chain("king", true, &[], &[(3, 3)]),
        ];
        let tracker = QuestTracker::new();
        let pick = |prioritize| {
            next_objective(&tracker, &chains, prioritize).map(|n| n.quest_id.0.as_str())
        };
        assert_eq!(pick(true), Some("king"));
        assert_eq!(pick(false), Some("herbs"));
    }

    #[test]
    fn exhausted_chain_is_skipped_and_objectives_follow_progress() {
        let chains = vec![
            chain("courier", true, &[], &[(1, 1), (2, 1)]),
            chain("fishing", false, &[], &[(4, 4)]),
        ];
        let mut tracker = QuestTracker::new();
        tracker.insert("courier".into(), started(1));
        let next = next_objective(&tracker, &chains, true).expect("second courier objective");
        assert_eq!(next.objective.target().x, 2);

        tracker.insert("courier".into(), started(2));
        let next = next_objective(&tracker, &chains, true).expect("falls through to side chain");
        assert_eq!(next.quest_id.0, "fishing");
    }

    #[test]
    fn completed_and_unknown_dependencies_leave_nothing_eligible() {
        let chains = vec![
            chain("done", true, &[], &[(1, 1)]),
            chain("orphan", false, &["missing"], &[(2, 2)]),
        ];
        let mut tracker = QuestTracker::new();
        tracker.insert("done".into(), QuestState { status: QuestStatus::Completed, ..started(0) });
        assert!(next_objective(&tracker, &chains, true).is_none());
        assert!(next_objective(&tracker, &chains, false).is_none());
    }
}
