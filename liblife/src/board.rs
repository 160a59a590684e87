use std::fmt;

use itertools::Itertools;
use log::trace;
use rand::{
    Rng,
    distr::{Bernoulli, Distribution},
};

use crate::{
    error::{Error, Result},
    grid::{Cell, Grid},
    notify::{SubscriptionId, Subscribers},
    pattern::Pattern,
    pos::Position,
    rule::RuleSet,
};

/// A grid of cells that tells its subscribers about every mutation.
///
/// Every method that changes cells calls [`Board::notify`] once it is done, so
/// subscribers always see a complete generation.
#[derive(Debug)]
pub struct Board {
    grid: Grid,
    generation: u64,
    rule: RuleSet,
    subscribers: Subscribers<Board>,
}

impl Board {
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        Ok(Self::with_grid(Grid::new(cols, rows)?))
    }

    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            generation: 0,
            rule: RuleSet::default(),
            subscribers: Subscribers::new(),
        }
    }

    pub fn builder() -> BoardBuilder {
        BoardBuilder::new()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snapshot(&self) -> Grid {
        self.grid.clone()
    }

    /// Number of times `advance` has run on this board.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The rule this board advances under: the last one passed to `advance` or `set_rule`.
    pub fn rule(&self) -> RuleSet {
        self.rule
    }

    /// Records the governing rule without touching any cell.
    pub fn set_rule(&mut self, rule: RuleSet) {
        self.rule = rule;
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn get<P>(&self, pos: P) -> Result<Cell>
    where
        P: Into<Position>,
    {
        self.grid.get(pos)
    }

    pub fn set<P>(&mut self, pos: P, cell: Cell) -> Result<()>
    where
        P: Into<Position>,
    {
        self.grid.set(pos, cell)?;
        self.notify();
        Ok(())
    }

    /// Flips a single cell, returning its new value.
    pub fn toggle<P>(&mut self, pos: P) -> Result<Cell>
    where
        P: Into<Position>,
    {
        let pos = pos.into();
        let cell = self.grid.get(pos)?.toggled();
        self.set(pos, cell)?;
        Ok(cell)
    }

    pub fn alive_neighbor_count<P>(&self, pos: P) -> Result<usize>
    where
        P: Into<Position>,
    {
        self.grid.alive_neighbor_count(pos)
    }

    /// Replaces the whole grid with its successor under `rule`.
    pub fn advance(&mut self, rule: &RuleSet) {
        self.grid = self.grid.next_generation(rule);
        self.generation += 1;
        self.rule = *rule;

        trace!(
            "advanced to generation {} with {rule}, population {}",
            self.generation,
            self.grid.population()
        );

        self.notify();
    }

    pub fn fill(&mut self, cell: Cell) {
        self.grid.fill(cell);
        self.notify();
    }

    pub fn clear(&mut self) {
        self.fill(Cell::Dead);
    }

    /// Makes each cell alive with probability `density`, independently of the others.
    pub fn randomize<R>(&mut self, rng: &mut R, density: f64) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        let distribution = Bernoulli::new(density).map_err(|_| Error::InvalidDensity(density))?;

        for cell in self.grid.cells_mut() {
            *cell = Cell::from(distribution.sample(rng));
        }

        self.notify();
        Ok(())
    }

    /// Sets the cells of `pattern` alive with its top left corner at `origin`.
    /// Nothing is written unless the whole pattern fits.
    pub fn stamp<P>(&mut self, pattern: Pattern, origin: P) -> Result<()>
    where
        P: Into<Position>,
    {
        let origin = origin.into();

        let positions = pattern
            .cells()
            .iter()
            .map(|(dx, dy)| Position {
                x: origin.x.saturating_add(*dx),
                y: origin.y.saturating_add(*dy),
            })
            .collect_vec();

        if let Some(outside) = positions.iter().find(|pos| !self.grid.contains(**pos)) {
            return Err(Error::OutOfRange {
                x: outside.x,
                y: outside.y,
                cols: self.cols(),
                rows: self.rows(),
            });
        }

        for pos in positions {
            self.grid.set(pos, Cell::Alive)?;
        }

        self.notify();
        Ok(())
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&Board) + Send + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn notify(&self) {
        self.subscribers.notify(self);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.grid, f)
    }
}

/// Builds a board cell by cell. Defaults to a 20x20 board of dead cells.
pub struct BoardBuilder {
    cols: usize,
    rows: usize,
    initializer: Box<dyn FnMut(Position) -> Cell>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self {
            cols: 20,
            rows: 20,
            initializer: Box::new(|_| Cell::Dead),
        }
    }

    pub fn cols(mut self, cols: usize) -> Self {
        self.cols = cols;
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    pub fn initializer<F>(mut self, initializer: F) -> Self
    where
        F: FnMut(Position) -> Cell + 'static,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn build(mut self) -> Result<Board> {
        let grid = Grid::from_fn(self.cols, self.rows, &mut self.initializer)?;
        Ok(Board::with_grid(grid))
    }
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::rule::Preset;

    fn counting(board: &mut Board) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let callback_count = count.clone();
        board.subscribe(move |_| {
            callback_count.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn builder_defaults_and_initializer() {
        let board = Board::builder().build().unwrap();
        assert_eq!((board.cols(), board.rows()), (20, 20));
        assert_eq!(board.population(), 0);

        let board = Board::builder()
            .cols(4)
            .rows(3)
            .initializer(|pos| Cell::from(pos.x == pos.y))
            .build()
            .unwrap();

        assert_eq!(board.to_string(), "#...\n.#..\n..#.\n");
        assert!(Board::builder().rows(0).build().is_err());
    }

    #[test]
    fn every_mutation_notifies_once() {
        let mut board = Board::new(5, 5).unwrap();
        let count = counting(&mut board);

        board.set([1, 1], Cell::Alive).unwrap();
        board.toggle([2, 2]).unwrap();
        board.advance(&Preset::Classic.rule());
        board.clear();
        board.stamp(Pattern::Block, [0, 0]).unwrap();
        board.randomize(&mut StdRng::seed_from_u64(1), 0.5).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 6);

        // Failed mutations leave the board alone and stay silent.
        assert!(board.set([5, 0], Cell::Alive).is_err());
        assert!(board.toggle([0, 9]).is_err());
        assert!(board.randomize(&mut StdRng::seed_from_u64(1), 1.5).is_err());
        assert_eq!(count.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn subscribers_see_the_new_generation() {
        let mut board = Board::new(5, 5).unwrap();
        board.stamp(Pattern::Blinker, [1, 2]).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let callback_seen = seen.clone();
        board.subscribe(move |board| {
            callback_seen
                .lock()
                .unwrap()
                .push((board.generation(), board.snapshot()));
        });

        let expected = board.grid().next_generation(&Preset::Classic.rule());
        board.advance(&Preset::Classic.rule());

        assert_eq!(*seen.lock().unwrap(), [(1, expected)]);
    }

    #[test]
    fn randomize_extremes() {
        let mut board = Board::new(6, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        board.randomize(&mut rng, 1.0).unwrap();
        assert_eq!(board.population(), 24);

        board.randomize(&mut rng, 0.0).unwrap();
        assert_eq!(board.population(), 0);

        assert_eq!(
            board.randomize(&mut rng, f64::NAN).map_err(|e| e.to_string()),
            Err("density NaN is outside 0.0..=1.0".to_owned())
        );
    }

    #[test]
    fn seeded_randomize_is_reproducible() {
        let mut a = Board::new(10, 10).unwrap();
        let mut b = Board::new(10, 10).unwrap();

        a.randomize(&mut StdRng::seed_from_u64(42), 0.3).unwrap();
        b.randomize(&mut StdRng::seed_from_u64(42), 0.3).unwrap();

        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn stamp_is_all_or_nothing() {
        let mut board = Board::new(4, 4).unwrap();

        assert_eq!(
            board.stamp(Pattern::Glider, [2, 0]),
            Err(Error::OutOfRange {
                x: 4,
                y: 1,
                cols: 4,
                rows: 4
            })
        );
        assert_eq!(board.population(), 0);

        board.stamp(Pattern::Glider, [1, 1]).unwrap();
        assert_eq!(board.to_string(), "....\n..#.\n...#\n.###\n");
    }

    #[test]
    fn toggle_flips() {
        let mut board = Board::new(2, 2).unwrap();

        assert_eq!(board.toggle([1, 0]), Ok(Cell::Alive));
        assert_eq!(board.get([1, 0]), Ok(Cell::Alive));
        assert_eq!(board.toggle([1, 0]), Ok(Cell::Dead));
        assert_eq!(board.population(), 0);
    }

    #[test]
    fn advance_counts_generations() {
        let mut board = Board::new(3, 3).unwrap();
        let rule = Preset::Seeds.rule();

        board.advance(&rule);
        board.advance(&rule);

        assert_eq!(board.generation(), 2);
        assert_eq!(board.population(), 0);
        assert_eq!(board.rule(), rule);
    }

    #[test]
    fn set_rule_leaves_cells_alone() {
        let mut board = Board::new(4, 4).unwrap();
        board.stamp(Pattern::Block, [1, 1]).unwrap();
        let count = counting(&mut board);

        assert_eq!(board.rule(), Preset::Classic.rule());
        board.set_rule(Preset::Maze.rule());

        assert_eq!(board.rule(), Preset::Maze.rule());
        assert_eq!(board.population(), 4);
        assert_eq!(board.generation(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
