// Text rendering of a GameState for logs and the duel tool.
//
//   # boundary   b/y trails   B/Y agents   * both agents   . empty
//
// A side panel lists both agents' counters next to the first rows of the board.

use std::fmt;

use crate::game::{Agent, Cell, GameState, Position, Side};

fn panel_line(row: usize, blue: &Agent, yellow: &Agent) -> Option<String> {
    let flag = |b: bool| if b { "T" } else { "F" };
    let (label, b, y) = match row {
        0 => ("Health", blue.health.to_string(), yellow.health.to_string()),
        1 => ("Score", blue.score.to_string(), yellow.score.to_string()),
        3 => (
            "RemTime",
            blue.breaker_remaining.to_string(),
            yellow.breaker_remaining.to_string(),
        ),
        4 => (
            "CoolDown",
            blue.breaker_cooldown.to_string(),
            yellow.breaker_cooldown.to_string(),
        ),
        6 => (
            "Breaker",
            flag(blue.is_breaker_active).to_string(),
            flag(yellow.is_breaker_active).to_string(),
        ),
        _ => return None,
    };
    Some(format!("  {:<9}B:{:<5}Y:{}", label, b, y))
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (blue, yellow) = if self.me.side == Side::Blue {
            (&self.me, &self.enemy)
        } else {
            (&self.enemy, &self.me)
        };

        write!(f, "    ")?;
        for col in 0..self.board.width() {
            write!(f, "{:<2}", col % 100)?;
        }
        writeln!(f)?;

        for row in 0..self.board.height() {
            write!(f, "{:>3} ", row)?;
            for col in 0..self.board.width() {
                let pos = Position::new(row as i32, col as i32);
                let glyph = if pos == blue.position && pos == yellow.position {
                    '*'
                } else if pos == blue.position {
                    'B'
                } else if pos == yellow.position {
                    'Y'
                } else {
                    match self.board.get(pos) {
                        Cell::Empty => '.',
                        Cell::Boundary => '#',
                        Cell::BlueTrail => 'b',
                        Cell::YellowTrail => 'y',
                    }
                };
                write!(f, "{} ", glyph)?;
            }
            if let Some(line) = panel_line(row, blue, yellow) {
                write!(f, "{}", line)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
