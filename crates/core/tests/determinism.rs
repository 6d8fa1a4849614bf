use autoplay::sim::advance_quests;
use autoplay::telemetry::digest;
use autoplay::{Agent, QuestStatus, QuestTracker, Scenario, Telemetry, Tile};

const VALLEY: &str = r#"
[map]
name = "valley"
tile_size = 16
rows = [
    '########',
    '#@....!#',
    '#..##..#',
    '#......#',
    '#......#',
    '########',
]

[[quests]]
id = "well"
is_main_quest = true
objectives = [{ target_x = 5, target_y = 1 }, { target_x = 5, target_y = 4 }]

[[quests]]
id = "garden"
dependencies = ["well"]
objectives = [{ target_x = 1, target_y = 4 }]
"#;

fn play(scenario: &Scenario, ticks: usize) -> Vec<Telemetry> {
    let mut agent = Agent::new(scenario.agent_config(), scenario.build_world());
    let mut tracker = QuestTracker::new();
    let mut records = Vec::with_capacity(ticks);
    for _ in 0..ticks {
        let record = agent.tick(1.0 / 60.0);
        if record.action == "explore:complete" {
            let mut strategy = agent.config().strategy.clone();
            strategy.explore_all_areas = false;
            agent.set_strategy(strategy);
        }
        if let Some(tile) = agent.world().player_tile()
            && advance_quests(&mut tracker, &scenario.quests, tile)
        {
            agent.set_quest_tracker(tracker.clone());
        }
        records.push(record);
    }
    records
}

#[test]
fn identical_runs_produce_identical_telemetry() {
    let scenario = Scenario::from_toml_str(VALLEY).expect("valid scenario");
    let left = play(&scenario, 300);
    let right = play(&scenario, 300);

    assert_eq!(left.len(), 300);
    assert_eq!(left, right, "telemetry sequences must match tick for tick");
    assert_eq!(digest(&left), digest(&right));
}

#[test]
fn full_run_completes_every_quest_and_exploration() {
    let scenario = Scenario::from_toml_str(VALLEY).expect("valid scenario");
    let records = play(&scenario, 300);

    assert!(records.iter().any(|r| r.action == "explore:complete"));
    assert!(records.iter().all(|r| r.errors.is_empty()));

    let last = records.last().expect("at least one tick");
    for quest in ["well", "garden"] {
        assert_eq!(
            last.quest_state.get(quest).map(String::as_str),
            Some(QuestStatus::Completed.label()),
            "{quest} should be completed"
        );
    }
}

#[test]
fn digest_changes_when_the_run_changes() {
    let scenario = Scenario::from_toml_str(VALLEY).expect("valid scenario");
    let mut moved = scenario.clone();
    moved.start = Tile::new(1, 3);

    let base = play(&scenario, 60);
    let other = play(&moved, 60);
    assert_ne!(digest(&base), digest(&other));
}
