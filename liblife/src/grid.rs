use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::{
    error::{Error, Result},
    pos::Position,
    rule::RuleSet,
};

/// The Moore neighborhood as (dx, dy) offsets.
const NEIGHBOR_RELATIVE_POSITIONS: &[[isize; 2]] = &[
    [-1, -1],
    [0, -1],
    [1, -1],
    [-1, 0],
    [1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    Alive,

    #[default]
    Dead,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    pub fn toggled(self) -> Self {
        match self {
            Cell::Alive => Cell::Dead,
            Cell::Dead => Cell::Alive,
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}

/// One generation: a `cols` x `rows` block of cells stored row by row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        Self::from_fn(cols, rows, |_| Cell::Dead)
    }

    pub fn from_fn<F>(cols: usize, rows: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(Position) -> Cell,
    {
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidDimensions { cols, rows });
        }

        let cells = (0..rows)
            .cartesian_product(0..cols)
            .map(|(y, x)| f(Position { x, y }))
            .collect();

        Ok(Self { cols, rows, cells })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get<P>(&self, pos: P) -> Result<Cell>
    where
        P: Into<Position>,
    {
        let index = self.checked_index(pos.into())?;
        Ok(self.cells[index])
    }

    pub fn set<P>(&mut self, pos: P, cell: Cell) -> Result<()>
    where
        P: Into<Position>,
    {
        let index = self.checked_index(pos.into())?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn enumerate_cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (self.index_to_pos(index), *cell))
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    pub fn alive_neighbor_count<P>(&self, pos: P) -> Result<usize>
    where
        P: Into<Position>,
    {
        let pos = pos.into();
        self.checked_index(pos)?;
        Ok(self.count_alive_neighbors(pos))
    }

    /// Builds the following generation. Every neighbor count is taken from `self`,
    /// which stays untouched, so no cell ever sees a partially updated neighborhood.
    pub fn next_generation(&self, rule: &RuleSet) -> Grid {
        let cells = self
            .enumerate_cells()
            .map(|(pos, cell)| {
                let alive_neighbors = self.count_alive_neighbors(pos);
                Cell::from(rule.next_liveness(cell.is_alive(), alive_neighbors))
            })
            .collect();

        Self {
            cols: self.cols,
            rows: self.rows,
            cells,
        }
    }

    // Positions past the edges count as dead; there is no wraparound.
    fn count_alive_neighbors(&self, pos: Position) -> usize {
        NEIGHBOR_RELATIVE_POSITIONS
            .iter()
            .filter_map(|[dx, dy]| pos.offset(*dx, *dy))
            .filter_map(|neighbor| self.index(neighbor))
            .filter(|index| self.cells[*index].is_alive())
            .count()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos).then(|| pos.x + pos.y * self.cols)
    }

    fn checked_index(&self, pos: Position) -> Result<usize> {
        self.index(pos).ok_or(Error::OutOfRange {
            x: pos.x,
            y: pos.y,
            cols: self.cols,
            rows: self.rows,
        })
    }

    fn index_to_pos(&self, index: usize) -> Position {
        Position {
            x: index % self.cols,
            y: index / self.cols,
        }
    }
}

/// One line per row, `#` for alive and `.` for dead.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row
                .iter()
                .map(|cell| if cell.is_alive() { '#' } else { '.' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Reads the `Display` format back. `#`, `O` and `*` are alive, `.` and `_` are dead;
/// blank lines are skipped and every row must have the same width.
impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lines = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect_vec();

        let cols = lines.first().map_or(0, |line| line.chars().count());
        let rows = lines.len();

        if cols == 0 {
            return Err(Error::InvalidDimensions { cols, rows });
        }

        let mut cells = Vec::with_capacity(cols * rows);
        for line in &lines {
            if line.chars().count() != cols {
                return Err(Error::InvalidNotation((*line).to_owned()));
            }

            for c in line.chars() {
                cells.push(match c {
                    '#' | 'O' | '*' => Cell::Alive,
                    '.' | '_' => Cell::Dead,
                    _ => return Err(Error::InvalidNotation((*line).to_owned())),
                });
            }
        }

        Ok(Self { cols, rows, cells })
    }
}
