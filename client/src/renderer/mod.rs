use std::io::{self, Write};

use colored::Colorize;
use liblife::{Board, Cell, RuleSet};

/// Draws the board to stdout every time it changes.
#[derive(Debug, Clone, Copy)]
pub struct TerminalRenderer {
    pub color: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// A board subscriber that redraws on every notification.
    pub fn subscriber(self) -> impl Fn(&Board) + Send + 'static {
        move |board: &Board| {
            let frame = self.render(board);

            let mut stdout = io::stdout().lock();
            // Nothing useful to do about a closed stdout from inside a tick.
            let _ = stdout.write_all(frame.as_bytes());
            let _ = stdout.flush();
        }
    }

    pub fn render(&self, board: &Board) -> String {
        let mut frame = format!(
            "generation {}, population {}, rule {}\n",
            board.generation(),
            board.population(),
            describe_rule(board.rule())
        );

        for (pos, cell) in board.grid().enumerate_cells() {
            let glyph = match cell {
                Cell::Alive if self.color => "#".bright_blue().bold().to_string(),
                Cell::Dead if self.color => ".".dimmed().to_string(),
                Cell::Alive => "#".to_owned(),
                Cell::Dead => ".".to_owned(),
            };
            frame.push_str(&glyph);

            if pos.x + 1 == board.cols() {
                frame.push('\n');
            }
        }

        frame
    }
}

/// Preset name and notation, or just the notation for a custom rule.
pub fn describe_rule(rule: RuleSet) -> String {
    match rule.preset() {
        Some(preset) => format!("{preset} ({rule})"),
        None => rule.to_string(),
    }
}
