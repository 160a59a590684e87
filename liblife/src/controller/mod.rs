use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use ticker::TickerHost;

use crate::{
    board::Board,
    error::Result,
    rule::{Preset, RuleSet},
};

mod ticker;

pub const DEFAULT_PERIOD_MS: u64 = 200;
pub const DEFAULT_DENSITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Time between two ticks while running, in milliseconds.
    pub period_ms: u64,

    /// Probability of a cell being alive after `randomize`.
    pub density: f64,

    /// Rule in effect until the first `set_strategy`.
    pub preset: Preset,
}

impl ControllerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            density: DEFAULT_DENSITY,
            preset: Preset::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Never started since the last `init`.
    Idle,
    Running,
    Paused,
}

/// Everything a tick touches. Shared with the ticker thread behind one mutex.
#[derive(Debug)]
struct Session {
    board: Option<Board>,
    rule: RuleSet,
}

impl Session {
    fn tick(&mut self) {
        let rule = self.rule;
        if let Some(board) = &mut self.board {
            board.advance(&rule);
        }
    }
}

// Recover the guard if a subscriber panicked mid-notify.
fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives a board: periodic ticking, rule switching and whole-board edits.
///
/// Operations that need a board silently do nothing until one is bound with [`Controller::init`].
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    session: Arc<Mutex<Session>>,
    ticker: Option<TickerHost>,
    state: ControllerState,
    period: Duration,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        let session = Session {
            board: None,
            rule: config.preset.rule(),
        };

        Self {
            config,
            session: Arc::new(Mutex::new(session)),
            ticker: None,
            state: ControllerState::Idle,
            period: config.period(),
        }
    }

    /// Binds `board`, replacing and dropping any previous one. A running timer is stopped first.
    pub fn init(&mut self, mut board: Board) {
        self.stop_ticker();

        info!("bound {}x{} board", board.cols(), board.rows());
        let mut session = lock(&self.session);
        board.set_rule(session.rule);
        session.board = Some(board);
        drop(session);

        self.state = ControllerState::Idle;
    }

    /// Starts ticking every `period`. Does nothing if already running.
    pub fn start(&mut self, period: Duration) {
        if self.state == ControllerState::Running {
            debug!("start ignored, already running");
            return;
        }

        info!("starting with a period of {period:?}");
        self.period = period;
        self.ticker = Some(TickerHost::start(self.session.clone(), period));
        self.state = ControllerState::Running;
    }

    pub fn pause(&mut self) {
        if self.stop_ticker() {
            info!("paused");
            self.state = ControllerState::Paused;
        }
    }

    /// Changes the period, also for the timer if it is running.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;

        if let Some(ticker) = &self.ticker {
            ticker.set_interval(period);
        }
    }

    /// Advances the bound board by one generation under the active rule.
    pub fn tick(&self) {
        lock(&self.session).tick();
    }

    pub fn step(&self, times: usize) {
        let mut session = lock(&self.session);
        for _ in 0..times {
            session.tick();
        }
    }

    /// Takes effect on the next tick; the board is left as it is.
    pub fn set_strategy(&self, rule: RuleSet) {
        debug!("switching rule to {rule}");
        let mut session = lock(&self.session);
        session.rule = rule;
        if let Some(board) = &mut session.board {
            board.set_rule(rule);
        }
    }

    /// Switches to a named preset. An unknown name is returned as an error
    /// and the active rule stays in place.
    pub fn set_strategy_by_name(&self, name: &str) -> Result<RuleSet> {
        let rule = Preset::from_name(name)
            .inspect_err(|e| warn!("{e}, keeping {}", self.rule()))?
            .rule();

        self.set_strategy(rule);
        Ok(rule)
    }

    pub fn rule(&self) -> RuleSet {
        lock(&self.session).rule
    }

    /// Randomizes the board at the configured density.
    pub fn randomize(&self) -> Result<()> {
        self.randomize_density(self.config.density)
    }

    pub fn randomize_density(&self, density: f64) -> Result<()> {
        self.randomize_with(&mut rand::rng(), density)
    }

    pub fn randomize_with<R>(&self, rng: &mut R, density: f64) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        match &mut lock(&self.session).board {
            Some(board) => board.randomize(rng, density),
            None => Ok(()),
        }
    }

    pub fn clear(&self) {
        if let Some(board) = &mut lock(&self.session).board {
            board.clear();
        }
    }

    /// Runs `f` against the bound board while ticks are held off.
    pub fn with_board<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&Board) -> R,
    {
        lock(&self.session).board.as_ref().map(f)
    }

    pub fn with_board_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Board) -> R,
    {
        lock(&self.session).board.as_mut().map(f)
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Generations advanced on the bound board.
    pub fn generation(&self) -> Option<u64> {
        self.with_board(Board::generation)
    }

    fn stop_ticker(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                ticker.stop();
                true
            }
            None => false,
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{error::Error, pattern::Pattern};

    fn bound(cols: usize, rows: usize) -> Controller {
        let mut controller = Controller::default();
        controller.init(Board::new(cols, rows).unwrap());
        controller
    }

    #[test]
    fn unbound_operations_are_no_ops() {
        let controller = Controller::default();

        controller.tick();
        controller.step(3);
        controller.clear();
        assert_eq!(controller.randomize(), Ok(()));
        assert_eq!(controller.generation(), None);
    }

    #[test]
    fn defaults() {
        let controller = bound(3, 3);

        assert_eq!(controller.rule(), Preset::Classic.rule());
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(controller.period(), Duration::from_millis(200));
    }

    #[test]
    fn tick_advances_with_active_rule() {
        let controller = bound(5, 5);
        controller
            .with_board_mut(|board| board.stamp(Pattern::Blinker, [1, 2]))
            .unwrap()
            .unwrap();

        controller.tick();
        assert_eq!(
            controller.with_board(|board| board.to_string()).unwrap(),
            ".....\n..#..\n..#..\n..#..\n.....\n"
        );

        // Under Seeds every alive cell dies and the three ends give birth.
        controller.set_strategy(Preset::Seeds.rule());
        controller.tick();
        assert_eq!(
            controller.with_board(|board| board.to_string()).unwrap(),
            ".....\n.#.#.\n.....\n.#.#.\n.....\n"
        );
        assert_eq!(controller.generation(), Some(2));
    }

    #[test]
    fn set_strategy_does_not_advance() {
        let controller = bound(4, 4);
        controller
            .with_board_mut(|board| board.stamp(Pattern::Block, [0, 0]))
            .unwrap()
            .unwrap();

        controller.set_strategy(Preset::Seeds.rule());

        assert_eq!(controller.generation(), Some(0));
        assert_eq!(controller.with_board(Board::population), Some(4));
        assert_eq!(controller.with_board(Board::rule), Some(Preset::Seeds.rule()));
    }

    #[test]
    fn bound_board_carries_the_active_rule() {
        let mut controller = Controller::new(ControllerConfig {
            preset: Preset::Vote,
            ..ControllerConfig::default()
        });
        controller.init(Board::new(3, 3).unwrap());

        assert_eq!(controller.with_board(Board::rule), Some(Preset::Vote.rule()));
    }

    #[test]
    fn unknown_preset_keeps_current_rule() {
        let controller = bound(3, 3);
        controller.set_strategy_by_name("maze").unwrap();

        assert_eq!(
            controller.set_strategy_by_name("not_a_rule"),
            Err(Error::UnknownPreset("not_a_rule".to_owned()))
        );
        assert_eq!(controller.rule(), Preset::Maze.rule());
    }

    #[test]
    fn randomize_and_clear() {
        let controller = bound(8, 6);
        let mut rng = StdRng::seed_from_u64(3);

        controller.randomize_with(&mut rng, 1.0).unwrap();
        assert_eq!(controller.with_board(Board::population), Some(48));

        controller.randomize_with(&mut rng, 0.0).unwrap();
        assert_eq!(controller.with_board(Board::population), Some(0));

        controller.randomize_with(&mut rng, 0.5).unwrap();
        controller.clear();
        assert_eq!(controller.with_board(Board::population), Some(0));

        assert_eq!(
            controller.randomize_density(-0.1),
            Err(Error::InvalidDensity(-0.1))
        );
    }

    #[test]
    fn randomize_uses_configured_density() {
        let mut full = Controller::new(ControllerConfig {
            density: 1.0,
            ..ControllerConfig::default()
        });
        full.init(Board::new(5, 4).unwrap());
        full.randomize().unwrap();
        assert_eq!(full.with_board(Board::population), Some(20));

        let mut empty = Controller::new(ControllerConfig {
            density: 0.0,
            ..ControllerConfig::default()
        });
        empty.init(Board::new(5, 4).unwrap());
        empty.randomize().unwrap();
        assert_eq!(empty.with_board(Board::population), Some(0));
    }

    #[test]
    fn pause_when_idle_stays_idle() {
        let mut controller = bound(3, 3);

        controller.pause();
        assert_eq!(controller.state(), ControllerState::Idle);
    }
}
