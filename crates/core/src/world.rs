//! Collaborator surface the agent drives: world queries, movement and interaction.
//! The agent never mutates world state directly; every side effect goes through
//! this trait so a host can plug in the real simulation or a test double.

use thiserror::Error;

use crate::grid::CollisionGrid;
use crate::types::{CombatAction, EntityRef, Facing, InteractionOutcome, Tile};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("player position unavailable")]
    PositionUnavailable,

    #[error("world query failed: {0}")]
    Query(String),

    #[error("movement system failed: {0}")]
    Movement(String),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("combat submission rejected: {0}")]
    Combat(String),
}

pub trait World {
    /// Player position in pixel space, or `None` when no controllable entity exists.
    fn player_position(&self) -> Result<Option<(f64, f64)>, WorldError>;

    /// Current HP over max HP, or `None` when health is not tracked.
    fn player_health(&self) -> Result<Option<f64>, WorldError>;

    fn find_interactable(&self, tile: Tile, facing: Facing)
    -> Result<Option<EntityRef>, WorldError>;

    fn trigger_interaction(
        &mut self,
        entity: EntityRef,
    ) -> Result<Option<InteractionOutcome>, WorldError>;

    /// Dynamic obstacles that are not part of the static collision grid.
    fn is_tile_occupied(&self, tile: Tile) -> bool;

    /// Issues one discrete movement intent toward an adjacent tile.
    fn set_move_target(&mut self, tile: Tile) -> Result<(), WorldError>;

    fn submit_combat_action(&mut self, action: &CombatAction) -> Result<(), WorldError>;

    /// Advances physically simulated entities; called once per tick after dispatch.
    fn apply_movement_step(
        &mut self,
        grid: &CollisionGrid,
        delta_time: f64,
    ) -> Result<(), WorldError>;
}
