//! Deterministic in-process world used by the harness binaries and tests.
//! It models just enough of the movement and interaction systems to drive the agent:
//! one player moving tile-to-tile in pixel space, consumable interactables, dynamic
//! obstacles and a record of every command the agent issued.

use std::cell::RefCell;
use std::collections::BTreeSet;

use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::grid::CollisionGrid;
use crate::types::{
    CombatAction, EntityRef, Facing, InteractionOutcome, QuestChain, QuestState, QuestStatus,
    QuestTracker, Tile,
};
use crate::world::{World, WorldError};

new_key_type! {
    pub struct InteractableKey;
}

/// Ticks per second the default movement speed is tuned for.
pub const DEFAULT_TICK_RATE: f64 = 60.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interactable {
    pub tile: Tile,
    pub kind: String,
    /// `None` never runs out.
    pub uses_left: Option<u32>,
}

/// Collaborator calls that can be made to fail once via [`GridWorld::fail_next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldCall {
    Position,
    Health,
    FindInteractable,
    TriggerInteraction,
    SetMoveTarget,
    SubmitCombatAction,
    MovementStep,
}

pub struct GridWorld {
    tile_size: f64,
    /// Pixels per second.
    speed: f64,
    player: Option<(f64, f64)>,
    hp: i32,
    max_hp: i32,
    move_target: Option<Tile>,
    occupied: BTreeSet<Tile>,
    interactables: SlotMap<InteractableKey, Interactable>,
    combat_log: Vec<CombatAction>,
    interaction_log: Vec<String>,
    faults: RefCell<Vec<WorldCall>>,
}

impl GridWorld {
    pub fn new(tile_size: u32) -> Self {
        let tile_size = f64::from(tile_size.max(1));
        Self {
            tile_size,
            speed: tile_size * DEFAULT_TICK_RATE,
            player: None,
            hp: 20,
            max_hp: 20,
            move_target: None,
            occupied: BTreeSet::new(),
            interactables: SlotMap::with_key(),
            combat_log: Vec::new(),
            interaction_log: Vec::new(),
            faults: RefCell::new(Vec::new()),
        }
    }

    pub fn with_player_at(mut self, tile: Tile) -> Self {
        self.place_player(tile);
        self
    }

    pub fn place_player(&mut self, tile: Tile) {
        self.player = Some(self.tile_origin(tile));
        self.move_target = None;
    }

    pub fn remove_player(&mut self) {
        self.player = None;
        self.move_target = None;
    }

    pub fn player_tile(&self) -> Option<Tile> {
        self.player.map(|(px, py)| {
            Tile::new((px / self.tile_size).floor() as i32, (py / self.tile_size).floor() as i32)
        })
    }

    pub fn set_speed(&mut self, pixels_per_second: f64) {
        self.speed = pixels_per_second.max(0.0);
    }

    pub fn set_health(&mut self, hp: i32, max_hp: i32) {
        self.max_hp = max_hp;
        self.hp = hp.min(max_hp);
    }

    pub fn set_occupied(&mut self, tile: Tile, occupied: bool) {
        if occupied {
            self.occupied.insert(tile);
        } else {
            self.occupied.remove(&tile);
        }
    }

    pub fn add_interactable(&mut self, tile: Tile, kind: &str, uses: Option<u32>) -> EntityRef {
        let item = Interactable { tile, kind: kind.to_string(), uses_left: uses };
        let key = self.interactables.insert(item);
        EntityRef(key.data().as_ffi())
    }

    pub fn interactable_count(&self) -> usize {
        self.interactables.len()
    }

    pub fn move_target(&self) -> Option<Tile> {
        self.move_target
    }

    pub fn combat_log(&self) -> &[CombatAction] {
        &self.combat_log
    }

    pub fn interaction_log(&self) -> &[String] {
        &self.interaction_log
    }

    /// Makes the next call of the given kind return an error.
    pub fn fail_next(&self, call: WorldCall) {
        self.faults.borrow_mut().push(call);
    }

    fn check_fault(&self, call: WorldCall) -> Result<(), WorldError> {
        let mut faults = self.faults.borrow_mut();
        let Some(idx) = faults.iter().position(|pending| *pending == call) else {
            return Ok(());
        };
        faults.remove(idx);
        Err(match call {
            WorldCall::Position | WorldCall::Health | WorldCall::FindInteractable => {
                WorldError::Query(format!("injected {call:?} fault"))
            }
            WorldCall::TriggerInteraction => {
                WorldError::Interaction(format!("injected {call:?} fault"))
            }
            WorldCall::SetMoveTarget | WorldCall::MovementStep => {
                WorldError::Movement(format!("injected {call:?} fault"))
            }
            WorldCall::SubmitCombatAction => WorldError::Combat(format!("injected {call:?} fault")),
        })
    }

    fn tile_origin(&self, tile: Tile) -> (f64, f64) {
        (f64::from(tile.x) * self.tile_size, f64::from(tile.y) * self.tile_size)
    }

    fn key_for(entity: EntityRef) -> InteractableKey {
        InteractableKey::from(KeyData::from_ffi(entity.0))
    }
}

impl World for GridWorld {
    fn player_position(&self) -> Result<Option<(f64, f64)>, WorldError> {
        self.check_fault(WorldCall::Position)?;
        Ok(self.player)
    }

    fn player_health(&self) -> Result<Option<f64>, WorldError> {
        self.check_fault(WorldCall::Health)?;
        if self.player.is_none() || self.max_hp <= 0 {
            return Ok(None);
        }
        Ok(Some(f64::from(self.hp) / f64::from(self.max_hp)))
    }

    fn find_interactable(
        &self,
        tile: Tile,
        facing: Facing,
    ) -> Result<Option<EntityRef>, WorldError> {
        self.check_fault(WorldCall::FindInteractable)?;
        let probe = tile.step(facing);
        Ok(self
            .interactables
            .iter()
            .find(|(_, item)| item.tile == probe && item.uses_left != Some(0))
            .map(|(key, _)| EntityRef(key.data().as_ffi())))
    }

    fn trigger_interaction(
        &mut self,
        entity: EntityRef,
    ) -> Result<Option<InteractionOutcome>, WorldError> {
        self.check_fault(WorldCall::TriggerInteraction)?;
        let key = Self::key_for(entity);
        let Some(item) = self.interactables.get_mut(key) else {
            return Err(WorldError::Interaction(format!("unknown entity {}", entity.0)));
        };
        let kind = item.kind.clone();
        let exhausted = match item.uses_left.as_mut() {
            Some(uses) => {
                *uses = uses.saturating_sub(1);
                *uses == 0
            }
            None => false,
        };
        if exhausted {
            self.interactables.remove(key);
        }
        self.interaction_log.push(kind.clone());
        Ok(Some(InteractionOutcome { kind }))
    }

    fn is_tile_occupied(&self, tile: Tile) -> bool {
        self.occupied.contains(&tile)
    }

    fn set_move_target(&mut self, tile: Tile) -> Result<(), WorldError> {
        self.check_fault(WorldCall::SetMoveTarget)?;
        if self.player.is_none() {
            return Err(WorldError::PositionUnavailable);
        }
        self.move_target = Some(tile);
        Ok(())
    }

    fn submit_combat_action(&mut self, action: &CombatAction) -> Result<(), WorldError> {
        self.check_fault(WorldCall::SubmitCombatAction)?;
        self.combat_log.push(action.clone());
        Ok(())
    }

    fn apply_movement_step(
        &mut self,
        grid: &CollisionGrid,
        delta_time: f64,
    ) -> Result<(), WorldError> {
        self.check_fault(WorldCall::MovementStep)?;
        let (Some(target), Some((px, py))) = (self.move_target, self.player) else {
            return Ok(());
        };
        if grid.is_blocked(target) || self.occupied.contains(&target) {
            self.move_target = None;
            return Ok(());
        }

        let (tx, ty) = self.tile_origin(target);
        let (dx, dy) = (tx - px, ty - py);
        let distance = dx.hypot(dy);
        let step = self.speed * delta_time.max(0.0);
        if distance <= step + 1e-6 {
            self.player = Some((tx, ty));
            self.move_target = None;
        } else if distance > 0.0 {
            self.player = Some((px + dx / distance * step, py + dy / distance * step));
        }
        Ok(())
    }
}

/// Host-side quest bookkeeping: standing on a pending objective completes it.
///
/// This is the collaborator's half of quest progress; the agent only reads the tracker.
pub fn advance_quests(tracker: &mut QuestTracker, chains: &[QuestChain], player: Tile) -> bool {
    let mut changed = false;
    for chain in chains {
        let state = tracker.get(&chain.id).copied().unwrap_or_default();
        if state.status == QuestStatus::Completed {
            continue;
        }
        let unlocked = chain.dependencies.iter().all(|dependency| {
            tracker.get(dependency).is_some_and(|dep| dep.status == QuestStatus::Completed)
        });
        if !unlocked {
            continue;
        }
        let Some(objective) = chain.objectives.get(state.objective_index) else {
            continue;
        };
        if objective.target() != player {
            continue;
        }
        let objective_index = state.objective_index + 1;
        let status = if objective_index >= chain.objectives.len() {
            QuestStatus::Completed
        } else {
            QuestStatus::Started
        };
        tracker.insert(chain.id.clone(), QuestState { status, objective_index });
        changed = true;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_reaches_adjacent_tile_in_one_default_tick() {
        let grid = CollisionGrid::open(5, 5);
        let mut world = GridWorld::new(16).with_player_at(Tile::new(1, 1));
        world.set_move_target(Tile::new(2, 1)).expect("player present");
        world.apply_movement_step(&grid, 1.0 / DEFAULT_TICK_RATE).expect("no fault");
        assert_eq!(world.player_tile(), Some(Tile::new(2, 1)));
        assert_eq!(world.move_target(), None);
    }

    #[test]
    fn slow_movement_stays_within_start_or_target_tile() {
        let grid = CollisionGrid::open(5, 5);
        let mut world = GridWorld::new(16).with_player_at(Tile::new(1, 1));
        world.set_speed(16.0 * 15.0);
        world.set_move_target(Tile::new(1, 2)).expect("player present");
        world.apply_movement_step(&grid, 1.0 / DEFAULT_TICK_RATE).expect("no fault");
        assert_eq!(world.player_tile(), Some(Tile::new(1, 1)));
        for _ in 0..3 {
            world.apply_movement_step(&grid, 1.0 / DEFAULT_TICK_RATE).expect("no fault");
        }
        assert_eq!(world.player_tile(), Some(Tile::new(1, 2)));
    }

    #[test]
    fn single_use_interactable_is_consumed() {
        let mut world = GridWorld::new(16).with_player_at(Tile::new(2, 2));
        world.add_interactable(Tile::new(2, 3), "chest", Some(1));
        let entity = world
            .find_interactable(Tile::new(2, 2), Facing::Down)
            .expect("no fault")
            .expect("chest below player");
        let outcome = world.trigger_interaction(entity).expect("no fault");
        assert_eq!(outcome.map(|o| o.kind), Some("chest".to_string()));
        assert_eq!(world.interactable_count(), 0);
        assert!(world.trigger_interaction(entity).is_err());
    }

    #[test]
    fn injected_fault_fires_once() {
        let world = GridWorld::new(16).with_player_at(Tile::new(0, 0));
        world.fail_next(WorldCall::Position);
        assert!(world.player_position().is_err());
        assert!(world.player_position().is_ok());
    }
}
