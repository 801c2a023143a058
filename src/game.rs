// Game model: board cells, agents, the action catalog and the tunables a game is played under.
//
// Everything here is plain data. Mutation during search goes through the Move Simulator
// (see simulator.rs), which is the only code that writes to a GameState in place.

use serde::{Deserialize, Serialize};

/// Grid coordinate. Rows grow downwards, columns grow to the right.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Position reached by applying a (row, col) delta
    pub fn offset(&self, (d_row, d_col): (i32, i32)) -> Position {
        Position {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

/// The two competing sides
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Side {
    Blue,
    Yellow,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Blue => Side::Yellow,
            Side::Yellow => Side::Blue,
        }
    }

    /// Trail cell left behind by this side
    pub fn trail(&self) -> Cell {
        match self {
            Side::Blue => Cell::BlueTrail,
            Side::Yellow => Cell::YellowTrail,
        }
    }
}

/// Content of a single board cell
///
/// Wire names follow the host's cell vocabulary (`AreaWall`, `BlueWall`, `YellowWall`).
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Cell {
    Empty,
    #[serde(rename = "AreaWall")]
    Boundary,
    #[serde(rename = "BlueWall")]
    BlueTrail,
    #[serde(rename = "YellowWall")]
    YellowTrail,
}

impl Cell {
    /// Side owning this cell, if it is a trail
    pub fn owner(&self) -> Option<Side> {
        match self {
            Cell::BlueTrail => Some(Side::Blue),
            Cell::YellowTrail => Some(Side::Yellow),
            Cell::Empty | Cell::Boundary => None,
        }
    }
}

/// The four facings an agent can have
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// (row, col) delta of one step in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// One of the eight move primitives: a direction, optionally activating the wall-breaker
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Right,
    Left,
    Up,
    Down,
    RightBreak,
    LeftBreak,
    UpBreak,
    DownBreak,
}

impl Action {
    /// Full catalog. Plain moves come first; search visits actions in this order.
    pub const ALL: [Action; 8] = [
        Action::Right,
        Action::Left,
        Action::Up,
        Action::Down,
        Action::RightBreak,
        Action::LeftBreak,
        Action::UpBreak,
        Action::DownBreak,
    ];

    pub fn plain(direction: Direction) -> Action {
        match direction {
            Direction::Right => Action::Right,
            Direction::Left => Action::Left,
            Direction::Up => Action::Up,
            Direction::Down => Action::Down,
        }
    }

    pub fn breaking(direction: Direction) -> Action {
        match direction {
            Direction::Right => Action::RightBreak,
            Direction::Left => Action::LeftBreak,
            Direction::Up => Action::UpBreak,
            Direction::Down => Action::DownBreak,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Action::Right | Action::RightBreak => Direction::Right,
            Action::Left | Action::LeftBreak => Direction::Left,
            Action::Up | Action::UpBreak => Direction::Up,
            Action::Down | Action::DownBreak => Direction::Down,
        }
    }

    pub fn activates_breaker(&self) -> bool {
        matches!(
            self,
            Action::RightBreak | Action::LeftBreak | Action::UpBreak | Action::DownBreak
        )
    }

    pub fn delta(&self) -> (i32, i32) {
        self.direction().delta()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Right => "Right",
            Action::Left => "Left",
            Action::Up => "Up",
            Action::Down => "Down",
            Action::RightBreak => "RightBreak",
            Action::LeftBreak => "LeftBreak",
            Action::UpBreak => "UpBreak",
            Action::DownBreak => "DownBreak",
        }
    }

    pub fn parse(s: &str) -> Result<Action, String> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid action: {}", s))
    }
}

/// Game tunables, received once from the host before the first decision
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub init_health: u32,
    pub wall_breaker_cooldown: u32,
    pub wall_breaker_duration: u32,
    pub wall_score_coefficient: i32,
    pub area_wall_crash_score: i32,
    pub my_wall_crash_score: i32,
    pub enemy_wall_crash_score: i32,
    pub max_cycles: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            init_health: 3,
            wall_breaker_cooldown: 12,
            wall_breaker_duration: 6,
            wall_score_coefficient: 1,
            area_wall_crash_score: -20,
            my_wall_crash_score: -40,
            enemy_wall_crash_score: -60,
            max_cycles: 300,
        }
    }
}

/// Rectangular grid of cells, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board with no walls at all
    pub fn new(height: usize, width: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Standard square arena: a boundary ring plus the fixed 2x2 center block
    pub fn arena(n: usize) -> Self {
        let mut board = Board::new(n, n);
        let center = [n / 2, (n / 2).saturating_sub(1)];

        for row in 0..n {
            for col in 0..n {
                let on_ring = row == 0 || col == 0 || row + 1 == n || col + 1 == n;
                let in_center = center.contains(&row) && center.contains(&col);
                if on_ring || in_center {
                    board.set(Position::new(row as i32, col as i32), Cell::Boundary);
                }
            }
        }

        board
    }

    /// Builds a board from host rows. All rows must share the same width.
    pub fn from_rows(rows: &[Vec<Cell>]) -> Result<Self, String> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err("Board must have at least one row and one column".to_string());
        }

        let mut cells = Vec::with_capacity(width * height);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(format!(
                    "Board row {} has width {}, expected {}",
                    i,
                    row.len(),
                    width
                ));
            }
            cells.extend_from_slice(row);
        }

        Ok(Board {
            width,
            height,
            cells,
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.width).map(|r| r.to_vec()).collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row < 0 || pos.col < 0 {
            return None;
        }
        let (row, col) = (pos.row as usize, pos.col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(row * self.width + col)
    }

    /// Cell at `pos`. Anything off the grid reads as boundary.
    #[inline]
    pub fn get(&self, pos: Position) -> Cell {
        match self.index(pos) {
            Some(i) => self.cells[i],
            None => Cell::Boundary,
        }
    }

    /// Overwrites the cell at `pos`
    ///
    /// # Panics
    /// If `pos` lies outside the grid.
    #[inline]
    pub fn set(&mut self, pos: Position, cell: Cell) {
        let i = self
            .index(pos)
            .unwrap_or_else(|| panic!("write outside the board at {:?}", pos));
        self.cells[i] = cell;
    }

    /// Number of cells holding `cell`
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}

/// Mutable per-side record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Agent {
    pub side: Side,
    pub direction: Direction,
    pub position: Position,
    pub score: i32,
    pub is_breaker_active: bool,
    pub can_activate_breaker: bool,
    pub breaker_cooldown: u32,
    pub breaker_remaining: u32,
    pub health: u32,
}

impl Agent {
    /// Fresh agent at full health with the breaker ready
    pub fn new(side: Side, direction: Direction, position: Position, rules: &Rules) -> Self {
        Agent {
            side,
            direction,
            position,
            score: 0,
            is_breaker_active: false,
            can_activate_breaker: true,
            breaker_cooldown: 0,
            breaker_remaining: 0,
            health: rules.init_health,
        }
    }

    /// Actions this agent may take: breaker variants only when it can activate,
    /// and never the one(s) turning straight back onto the cell it just left.
    pub fn legal_actions(&self) -> Vec<Action> {
        let available = if self.can_activate_breaker { 8 } else { 4 };
        let back = self.direction.opposite();

        Action::ALL[..available]
            .iter()
            .copied()
            .filter(|a| a.direction() != back)
            .collect()
    }

    /// Ticks the wall-breaker timers after a completed move.
    ///
    /// Reads the pre-tick values first, then applies every change from that snapshot.
    pub fn advance_timers(&mut self, rules: &Rules) {
        let remaining = self.breaker_remaining;
        let cooldown = self.breaker_cooldown;

        if remaining > 0 {
            self.breaker_remaining = remaining - 1;
            self.breaker_cooldown = cooldown.saturating_sub(1);
        } else if cooldown > 0 && cooldown < rules.wall_breaker_cooldown {
            self.breaker_cooldown = cooldown - 1;
        }

        // last active tick
        if remaining == 1 {
            self.is_breaker_active = false;
        }

        if self.breaker_cooldown == 0 {
            self.can_activate_breaker = true;
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Which of the two agents in a GameState is acting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Me,
    Enemy,
}

impl Player {
    pub fn other(&self) -> Player {
        match self {
            Player::Me => Player::Enemy,
            Player::Enemy => Player::Me,
        }
    }
}

/// The unit of simulation: one board, both agents, and the rules they play under.
///
/// Search mutates a single instance in place; see `simulator.rs` for commit/reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub me: Agent,
    pub enemy: Agent,
    pub rules: Rules,
    /// Number of commits currently outstanding (not yet reversed)
    pub(crate) stack_height: u32,
}

impl GameState {
    pub fn new(board: Board, me: Agent, enemy: Agent, rules: Rules) -> Self {
        GameState {
            board,
            me,
            enemy,
            rules,
            stack_height: 0,
        }
    }

    pub fn agent(&self, player: Player) -> &Agent {
        match player {
            Player::Me => &self.me,
            Player::Enemy => &self.enemy,
        }
    }

    pub fn agent_mut(&mut self, player: Player) -> &mut Agent {
        match player {
            Player::Me => &mut self.me,
            Player::Enemy => &mut self.enemy,
        }
    }

    /// Player whose agent plays `side`. Ties go to `Me`.
    pub fn player_of(&self, side: Side) -> Player {
        if self.me.side == side {
            Player::Me
        } else {
            Player::Enemy
        }
    }

    /// Either agent is out of health, or both stand on the same cell
    pub fn is_terminal(&self) -> bool {
        !self.me.is_alive() || !self.enemy.is_alive() || self.me.position == self.enemy.position
    }

    /// Outstanding commits; zero whenever no search frame is live
    pub fn stack_height(&self) -> u32 {
        self.stack_height
    }
}
