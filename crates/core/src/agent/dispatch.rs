//! Goal execution: turns the arbiter's choice into at most one concrete command.
//! Every branch returns a short machine-readable action string for telemetry.

use super::pathfinding::{StepFailure, find_path, move_along_path, reachable_tiles};
use super::*;

impl<'a, W: World> Agent<'a, W> {
    pub(super) fn execute(
        &mut self,
        goal: Goal<'a>,
        snapshot: &TickSnapshot,
    ) -> Result<String, AgentError> {
        match goal {
            Goal::Combat => self.execute_combat(),
            Goal::Heal => self.execute_heal(),
            Goal::Quest(next) => self.execute_quest(next, snapshot.tile),
            Goal::Navigate => self.execute_navigate(snapshot.tile),
            Goal::Explore => self.execute_explore(snapshot.tile),
            Goal::Interact(entity) => self.execute_interact(entity),
            Goal::Idle => Ok("idle".to_string()),
        }
    }

    fn execute_combat(&mut self) -> Result<String, AgentError> {
        let Some(state) = self.state.combat_state.as_ref() else {
            return Ok("combat:no-state".to_string());
        };
        let Some(actor) = state.active_actor() else {
            return Ok("combat:no-turn".to_string());
        };
        if !state.combatant(actor).is_some_and(|c| c.side == Side::Party) {
            return Ok("combat:wait".to_string());
        }
        let style = self.config.strategy.combat_style;
        let action = combat::select_action(state, actor, style, &self.config.tuning);
        self.world.submit_combat_action(&action)?;
        Ok(format!("combat:{}", action.kind_label()))
    }

    fn execute_heal(&mut self) -> Result<String, AgentError> {
        if self.state.screen != Screen::Combat {
            return Ok("heal:noop".to_string());
        }
        let Some(state) = self.state.combat_state.as_ref() else {
            return Ok("heal:noop".to_string());
        };
        let party_turn = state
            .active_actor()
            .and_then(|actor| state.combatant(actor))
            .is_some_and(|c| c.side == Side::Party);
        if !party_turn {
            return Ok("heal:wait".to_string());
        }
        self.world.submit_combat_action(&CombatAction::Defend)?;
        Ok("heal:defend".to_string())
    }

    fn execute_quest(
        &mut self,
        next: NextObjective<'a>,
        current: Tile,
    ) -> Result<String, AgentError> {
        let id = next.quest_id;
        let path = find_path(self.config.grid, current, next.objective.target());
        tracing::debug!(quest = %id, path_len = path.len(), "quest path planned");
        match path.len() {
            0 => {
                self.clear_path();
                Ok(format!("quest:unreachable:{id}"))
            }
            1 => {
                self.clear_path();
                Ok(format!("quest:at-objective:{id}"))
            }
            _ => {
                if self.begin_path(path)? {
                    Ok(format!("quest:navigate:{id}"))
                } else {
                    Ok(format!("quest:replan:{id}"))
                }
            }
        }
    }

    fn execute_navigate(&mut self, current: Tile) -> Result<String, AgentError> {
        let Some(position) = self.state.current_path.iter().position(|tile| *tile == current) else {
            self.clear_path();
            return Ok("navigate:failed".to_string());
        };
        self.state.path_index = position;
        if self.state.path_index + 1 >= self.state.current_path.len() {
            self.clear_path();
            return Ok("navigate:complete".to_string());
        }

        match move_along_path(
            &mut self.world,
            self.config.grid,
            &self.state.current_path,
            self.state.path_index,
        ) {
            Ok(next) => {
                self.face_along_path(next);
                self.state.path_index = next;
                Ok("navigate:step".to_string())
            }
            Err(StepFailure::World(err)) => {
                self.clear_path();
                Err(err.into())
            }
            Err(StepFailure::Blocked(_) | StepFailure::EndOfPath) => {
                self.clear_path();
                Ok("navigate:failed".to_string())
            }
        }
    }

    fn execute_explore(&mut self, current: Tile) -> Result<String, AgentError> {
        let reachable = reachable_tiles(self.config.grid, current);
        let candidates: Vec<Tile> =
            exploration::unexplored_tiles(&self.state.visited_tiles, self.config.grid)
                .into_iter()
                .filter(|tile| reachable.contains(tile))
                .collect();

        let Some(target) = exploration::pick_exploration_target(&candidates, current) else {
            if !self.state.current_path.is_empty() {
                self.clear_path();
            }
            tracing::info!(visited = self.state.visited_tiles.len(), "exploration complete");
            return Ok("explore:complete".to_string());
        };

        let path = find_path(self.config.grid, current, target);
        tracing::debug!(%target, path_len = path.len(), "exploration target");
        if path.len() < 2 {
            self.clear_path();
            return Ok("explore:unreachable".to_string());
        }
        if self.begin_path(path)? {
            Ok("explore:step".to_string())
        } else {
            Ok("explore:replan".to_string())
        }
    }

    fn execute_interact(&mut self, entity: EntityRef) -> Result<String, AgentError> {
        match self.world.trigger_interaction(entity)? {
            Some(outcome) => Ok(format!("interact:{}", outcome.kind)),
            None => Ok("interact:nothing".to_string()),
        }
    }

    /// Issues the first step of a fresh path and stores it for later navigation.
    /// Returns `false` when the first step is blocked and the caller should replan.
    fn begin_path(&mut self, path: Path) -> Result<bool, AgentError> {
        match move_along_path(&mut self.world, self.config.grid, &path, 0) {
            Ok(next) => {
                self.state.current_path = path;
                self.face_along_path(next);
                self.state.path_index = next;
                Ok(true)
            }
            Err(StepFailure::World(err)) => {
                self.clear_path();
                Err(err.into())
            }
            Err(StepFailure::Blocked(_) | StepFailure::EndOfPath) => {
                self.clear_path();
                Ok(false)
            }
        }
    }

    fn face_along_path(&mut self, next: usize) {
        let path = &self.state.current_path;
        if next == 0 || next >= path.len() {
            return;
        }
        if let Some(facing) = Facing::between(path[next - 1], path[next]) {
            self.state.facing = facing;
        }
    }

    fn clear_path(&mut self) {
        self.state.current_path.clear();
        self.state.path_index = 0;
    }
}
