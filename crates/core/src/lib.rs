//! Autonomous goal-driven agent for tile-based RPG worlds.
//!
//! The crate is host-agnostic: the agent reads and commands its world only through
//! the [`World`] trait, and [`sim::GridWorld`] is a small deterministic implementation
//! used by the harness binaries and tests.

pub mod agent;
pub mod config;
pub mod error;
pub mod grid;
pub mod sim;
pub mod telemetry;
pub mod types;
pub mod world;

pub use agent::pathfinding::{find_path, move_along_path};
pub use agent::{Agent, AgentConfig, AgentState};
pub use config::{Scenario, load_scenario};
pub use error::{AgentError, ConfigError};
pub use grid::CollisionGrid;
pub use sim::GridWorld;
pub use telemetry::{Telemetry, TelemetryLog};
pub use types::*;
pub use world::{World, WorldError};
