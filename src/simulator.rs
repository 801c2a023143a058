// Move Simulator: applies one action for one agent in place and undoes it exactly.
//
// Commits and reverses nest like a stack. Every commit stamps its token with the stack
// height it produced; reversing anything but the most recent commit panics.

use std::ops::{Deref, DerefMut};

use crate::game::{Action, Agent, Cell, GameState, Player, Position};
use crate::profile;

/// Everything needed to restore a GameState to its pre-commit value
#[derive(Debug)]
pub struct UndoToken {
    player: Player,
    agent: Agent,
    origin_cell: Cell,
    destination: Position,
    destination_cell: Cell,
    debited: Option<Player>,
    stack_height: u32,
}

impl UndoToken {
    /// Agent that made the move
    pub fn player(&self) -> Player {
        self.player
    }

    /// Mover's record as it was before the commit
    pub fn agent_before(&self) -> &Agent {
        &self.agent
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    /// Content of the destination cell before the commit
    pub fn destination_cell(&self) -> Cell {
        self.destination_cell
    }

    /// Player whose trail was hit and who lost a point for it
    pub fn debited(&self) -> Option<Player> {
        self.debited
    }
}

impl GameState {
    /// Applies `action` for `player`, returning the token that undoes it.
    ///
    /// The action must come from the mover's `legal_actions()`.
    pub fn commit(&mut self, player: Player, action: Action) -> UndoToken {
        profile!("commit", {
            debug_assert!(
                self.agent(player).legal_actions().contains(&action),
                "{:?} is not legal for {:?}",
                action,
                player
            );

            let rules = self.rules;
            let before = *self.agent(player);
            let origin = before.position;
            let destination = origin.offset(action.delta());
            let origin_cell = self.board.get(origin);
            let destination_cell = self.board.get(destination);
            let mut debited = None;

            {
                let agent = self.agent_mut(player);
                if action.activates_breaker()
                    && agent.can_activate_breaker
                    && !agent.is_breaker_active
                {
                    agent.is_breaker_active = true;
                    agent.can_activate_breaker = false;
                    agent.breaker_cooldown = rules.wall_breaker_cooldown;
                    agent.breaker_remaining = rules.wall_breaker_duration + 1;
                }
                agent.score += rules.wall_score_coefficient;
            }
            self.board.set(origin, before.side.trail());

            if destination_cell == Cell::Boundary {
                let agent = self.agent_mut(player);
                agent.score += rules.area_wall_crash_score;
                agent.health = 0;
            } else if let Some(owner) = destination_cell.owner() {
                // the trail's owner pays the toll, whoever runs into it
                let owner_player = self.player_of(owner);
                self.agent_mut(owner_player).score -= 1;
                debited = Some(owner_player);

                let agent = self.agent_mut(player);
                if !agent.is_breaker_active {
                    if agent.health == 1 {
                        agent.score += if owner == agent.side {
                            rules.my_wall_crash_score
                        } else {
                            rules.enemy_wall_crash_score
                        };
                    }
                    agent.health = agent.health.saturating_sub(1);
                }
            }

            if self.agent(player).is_alive() {
                self.board.set(destination, Cell::Empty);
                let agent = self.agent_mut(player);
                agent.position = destination;
                agent.direction = action.direction();
                agent.advance_timers(&rules);
            }

            self.stack_height += 1;

            UndoToken {
                player,
                agent: before,
                origin_cell,
                destination,
                destination_cell,
                debited,
                stack_height: self.stack_height,
            }
        })
    }

    /// Undoes the most recent commit.
    ///
    /// # Panics
    /// If `token` does not belong to the most recent outstanding commit.
    pub fn reverse(&mut self, token: UndoToken) {
        assert_eq!(
            token.stack_height, self.stack_height,
            "undo token from commit #{} reversed while #{} is outstanding",
            token.stack_height, self.stack_height
        );

        // the destination was only written if the mover survived and left its cell
        if self.agent(token.player).position != token.agent.position {
            self.board.set(token.destination, token.destination_cell);
        }

        if let Some(owner) = token.debited {
            self.agent_mut(owner).score += 1;
        }

        *self.agent_mut(token.player) = token.agent;
        self.board.set(token.agent.position, token.origin_cell);
        self.stack_height -= 1;
    }

    /// Applies `action` for good, as a driver advancing a real game does.
    ///
    /// No undo token is kept, so the stack height stays where it was.
    ///
    /// # Panics
    /// In debug builds, if a search frame is still live.
    pub fn apply(&mut self, player: Player, action: Action) {
        debug_assert_eq!(self.stack_height, 0, "apply during a live search");
        let _ = self.commit(player, action);
        self.stack_height -= 1;
    }

    /// Commits `action` and hands back a guard that reverses it when dropped.
    ///
    /// While the guard lives the state is reachable only through it, so nested moves
    /// are necessarily undone in reverse order, unwinding included.
    pub fn play(&mut self, player: Player, action: Action) -> MoveGuard<'_> {
        let token = self.commit(player, action);
        MoveGuard {
            state: self,
            token: Some(token),
        }
    }
}

/// Scoped move: derefs to the GameState with the move applied, undoes it on drop
pub struct MoveGuard<'a> {
    state: &'a mut GameState,
    token: Option<UndoToken>,
}

impl<'a> MoveGuard<'a> {
    pub fn token(&self) -> Option<&UndoToken> {
        self.token.as_ref()
    }
}

impl<'a> Deref for MoveGuard<'a> {
    type Target = GameState;

    fn deref(&self) -> &GameState {
        self.state
    }
}

impl<'a> DerefMut for MoveGuard<'a> {
    fn deref_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl<'a> Drop for MoveGuard<'a> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.state.reverse(token);
        }
    }
}
