// Host API types
//
// The host sends the tunables once at game start and a full world snapshot every cycle,
// and expects a list of commands back.

use serde::{Deserialize, Serialize};

use crate::game::{Action, Agent, Board, Cell, Direction, GameState, Position, Rules, Side};

/// Payload of the game start call
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StartRequest {
    pub game_id: String,
    pub constants: Rules,
}

/// Payload of the game end call
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EndRequest {
    pub game_id: String,
    #[serde(default)]
    pub winner: Option<Side>,
}

/// One side's agent as reported by the host
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AgentView {
    pub side: Side,
    pub direction: Direction,
    pub position: Position,
    pub score: i32,
    pub health: u32,
    #[serde(default)]
    pub wall_breaker_active: bool,
    pub wall_breaker_cooldown: u32,
    pub wall_breaker_rem_time: u32,
}

impl AgentView {
    /// Search-side record for this agent
    pub fn to_agent(&self) -> Agent {
        Agent {
            side: self.side,
            direction: self.direction,
            position: self.position,
            score: self.score,
            // the tick count is authoritative; a stale active flag with no ticks left is ignored
            is_breaker_active: self.wall_breaker_rem_time > 0,
            can_activate_breaker: self.wall_breaker_rem_time == 0 && self.wall_breaker_cooldown == 0,
            breaker_cooldown: self.wall_breaker_cooldown,
            breaker_remaining: self.wall_breaker_rem_time,
            health: self.health,
        }
    }

    pub fn from_agent(agent: &Agent) -> Self {
        AgentView {
            side: agent.side,
            direction: agent.direction,
            position: agent.position,
            score: agent.score,
            health: agent.health,
            wall_breaker_active: agent.is_breaker_active,
            wall_breaker_cooldown: agent.breaker_cooldown,
            wall_breaker_rem_time: agent.breaker_remaining,
        }
    }
}

/// Complete world state received each cycle
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorldSnapshot {
    pub turn: u32,
    pub my_side: Side,
    pub board: Vec<Vec<Cell>>,
    pub agents: Vec<AgentView>,
}

impl WorldSnapshot {
    /// Builds the fresh GameState a decision searches on
    pub fn to_game_state(&self, rules: &Rules) -> Result<GameState, String> {
        let board = Board::from_rows(&self.board)?;
        let me = self.agent_view(self.my_side)?.to_agent();
        let enemy = self.agent_view(self.my_side.opponent())?.to_agent();

        for agent in [&me, &enemy] {
            let p = agent.position;
            if p.row < 0
                || p.col < 0
                || p.row as usize >= board.height()
                || p.col as usize >= board.width()
            {
                return Err(format!("{:?} agent at {:?} is off the board", agent.side, p));
            }
        }

        Ok(GameState::new(board, me, enemy, *rules))
    }

    pub fn from_game_state(turn: u32, state: &GameState) -> Self {
        WorldSnapshot {
            turn,
            my_side: state.me.side,
            board: state.board.to_rows(),
            agents: vec![
                AgentView::from_agent(&state.me),
                AgentView::from_agent(&state.enemy),
            ],
        }
    }

    pub fn agent_view(&self, side: Side) -> Result<&AgentView, String> {
        self.agents
            .iter()
            .find(|a| a.side == side)
            .ok_or_else(|| format!("No {:?} agent in snapshot", side))
    }
}

/// Instruction sent back to the host
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Command {
    ChangeDirection { direction: Direction },
    ActivateWallBreaker,
}

impl Command {
    /// Commands carrying out `action`: breaker activation first, then the turn
    pub fn for_action(action: Action) -> Vec<Command> {
        let mut commands = Vec::with_capacity(2);
        if action.activates_breaker() {
            commands.push(Command::ActivateWallBreaker);
        }
        commands.push(Command::ChangeDirection {
            direction: action.direction(),
        });
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;
    use serde_json::json;

    #[test]
    fn test_breaker_action_emits_activation_then_turn() {
        assert_eq!(
            Command::for_action(Action::LeftBreak),
            vec![
                Command::ActivateWallBreaker,
                Command::ChangeDirection {
                    direction: Direction::Left
                }
            ]
        );
        assert_eq!(Command::for_action(Action::Up).len(), 1);
    }

    #[test]
    fn test_command_wire_format() {
        let value = serde_json::to_value(Command::ChangeDirection {
            direction: Direction::Down,
        })
        .unwrap();
        assert_eq!(value, json!({"type": "ChangeDirection", "direction": "Down"}));
    }

    #[test]
    fn test_snapshot_parses_host_cell_names() {
        let snapshot: WorldSnapshot = serde_json::from_value(json!({
            "turn": 4,
            "my_side": "Yellow",
            "board": [
                ["AreaWall", "AreaWall", "AreaWall"],
                ["AreaWall", "BlueWall", "Empty"],
                ["AreaWall", "YellowWall", "Empty"]
            ],
            "agents": [
                {"side": "Blue", "direction": "Up", "position": {"row": 1, "col": 2},
                 "score": 3, "health": 2, "wall_breaker_cooldown": 0, "wall_breaker_rem_time": 0},
                {"side": "Yellow", "direction": "Down", "position": {"row": 2, "col": 2},
                 "score": 1, "health": 3, "wall_breaker_cooldown": 9, "wall_breaker_rem_time": 4}
            ]
        }))
        .unwrap();

        let state = snapshot.to_game_state(&Rules::default()).unwrap();
        assert_eq!(state.me.side, Side::Yellow);
        assert!(state.me.is_breaker_active);
        assert!(!state.me.can_activate_breaker);
        assert!(state.enemy.can_activate_breaker);
        assert_eq!(state.board.get(Position::new(1, 1)), Cell::BlueTrail);
        assert_eq!(state.board.get(Position::new(2, 1)), Cell::YellowTrail);
    }

    #[test]
    fn test_stale_breaker_flag_without_ticks_is_inactive() {
        let rules = Rules::default();
        let mut state = GameState::new(
            Board::arena(10),
            Agent::new(Side::Blue, Direction::Down, Position::new(1, 1), &rules),
            Agent::new(Side::Yellow, Direction::Up, Position::new(8, 8), &rules),
            rules,
        );
        for row in 2..8 {
            state.board.set(Position::new(row, 1), Cell::YellowTrail);
        }
        let mut snapshot = WorldSnapshot::from_game_state(3, &state);
        snapshot.agents[0].wall_breaker_active = true;
        snapshot.agents[0].wall_breaker_cooldown = 3;
        snapshot.agents[0].wall_breaker_rem_time = 0;

        let mut state = snapshot.to_game_state(&rules).unwrap();
        assert!(!state.me.is_breaker_active);
        assert!(!state.me.can_activate_breaker);

        let _ = state.commit(Player::Me, Action::Down);
        assert_eq!(state.me.health, 2, "trail entry must cost health");
        let _ = state.commit(Player::Me, Action::Down);
        let _ = state.commit(Player::Me, Action::Down);
        assert_eq!(state.me.health, 0);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_snapshot_missing_side_is_an_error() {
        let rules = Rules::default();
        let state = GameState::new(
            Board::arena(6),
            Agent::new(Side::Blue, Direction::Down, Position::new(1, 1), &rules),
            Agent::new(Side::Yellow, Direction::Up, Position::new(4, 4), &rules),
            rules,
        );
        let mut snapshot = WorldSnapshot::from_game_state(0, &state);
        assert_eq!(snapshot.to_game_state(&rules).unwrap(), state);

        snapshot.agents.pop();
        assert!(snapshot.to_game_state(&rules).is_err());
    }
}
