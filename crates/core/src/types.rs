use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid coordinate in tile space. Field order makes the derived `Ord` raster order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub y: i32,
    pub x: i32,
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, facing: Facing) -> Self {
        match facing {
            Facing::Up => Self { y: self.y - 1, x: self.x },
            Facing::Right => Self { y: self.y, x: self.x + 1 },
            Facing::Down => Self { y: self.y + 1, x: self.x },
            Facing::Left => Self { y: self.y, x: self.x - 1 },
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Ordered tiles from the current tile to the target, both inclusive.
pub type Path = Vec<Tile>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Right,
    #[default]
    Down,
    Left,
}

impl Facing {
    /// Direction of a single orthogonal step, if `to` is adjacent to `from`.
    pub fn between(from: Tile, to: Tile) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (0, -1) => Some(Self::Up),
            (1, 0) => Some(Self::Right),
            (0, 1) => Some(Self::Down),
            (-1, 0) => Some(Self::Left),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Overworld,
    Combat,
    Dialogue,
    Menu,
    Transition,
    Title,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalType {
    #[default]
    Idle,
    Navigate,
    Explore,
    Interact,
    Combat,
    Quest,
    Heal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStyle {
    Aggressive,
    #[default]
    Balanced,
    Defensive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    pub explore_all_areas: bool,
    pub prioritize_main_quest: bool,
    pub combat_style: CombatStyle,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            explore_all_areas: true,
            prioritize_main_quest: true,
            combat_style: CombatStyle::Balanced,
        }
    }
}

/// How much per-tick telemetry the agent keeps before the host drains it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    Unbounded,
    Ring(usize),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub stuck_threshold: u32,
    pub defend_hp_ratio: f64,
    pub item_hp_ratio: f64,
    pub telemetry_retention: Retention,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            stuck_threshold: 50,
            defend_hp_ratio: 0.5,
            item_hp_ratio: 0.25,
            telemetry_retention: Retention::Ring(4096),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub String);

impl From<&str> for QuestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub target_x: i32,
    pub target_y: i32,
    #[serde(default)]
    pub description: String,
}

impl Objective {
    pub fn target(&self) -> Tile {
        Tile::new(self.target_x, self.target_y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestChain {
    pub id: QuestId,
    #[serde(default)]
    pub is_main_quest: bool,
    #[serde(default)]
    pub dependencies: Vec<QuestId>,
    pub objectives: Vec<Objective>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    #[default]
    NotStarted,
    Started,
    Completed,
}

impl QuestStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestState {
    pub status: QuestStatus,
    /// Objectives the collaborator has already marked complete.
    pub objective_index: usize,
}

pub type QuestTracker = BTreeMap<QuestId, QuestState>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NextObjective<'a> {
    pub quest_id: &'a QuestId,
    pub objective: &'a Objective,
    pub is_main_quest: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Party,
    Enemy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub power: i32,
    pub mana_cost: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: ActorId,
    pub side: Side,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub mana: i32,
    pub skills: Vec<Skill>,
    pub potions: u32,
}

impl Combatant {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        f64::from(self.hp) / f64::from(self.max_hp)
    }
}

/// Externally supplied snapshot of an ongoing battle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub combatants: Vec<Combatant>,
    pub turn_order: Vec<ActorId>,
    pub current_turn_index: usize,
}

impl CombatState {
    pub fn active_actor(&self) -> Option<ActorId> {
        self.turn_order.get(self.current_turn_index).copied()
    }

    pub fn combatant(&self, id: ActorId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatAction {
    Attack { target: ActorId },
    Defend,
    Skill { skill: String, target: ActorId },
    Item { target: ActorId },
}

impl CombatAction {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Attack { .. } => "attack",
            Self::Defend => "defend",
            Self::Skill { .. } => "skill",
            Self::Item { .. } => "item",
        }
    }

    pub fn target(&self) -> Option<ActorId> {
        match self {
            Self::Attack { target } | Self::Skill { target, .. } | Self::Item { target } => {
                Some(*target)
            }
            Self::Defend => None,
        }
    }
}

/// Opaque handle to something the player can interact with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef(pub u64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub kind: String,
}
