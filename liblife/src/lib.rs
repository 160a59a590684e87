//! Life-like cellular automata on a bounded grid.
//!
//! A [`Board`] holds one generation and advances it under a [`RuleSet`]; a
//! [`Controller`] drives a board on a timer. Renderers hook in through
//! [`Board::subscribe`].

pub mod board;
pub mod controller;
pub mod error;
pub mod grid;
pub mod notify;
pub mod pattern;
pub mod pos;
pub mod rule;

pub use board::{Board, BoardBuilder};
pub use controller::{Controller, ControllerConfig, ControllerState};
pub use error::{Error, Result};
pub use grid::{Cell, Grid};
pub use notify::SubscriptionId;
pub use pattern::Pattern;
pub use pos::Position;
pub use rule::{Preset, RuleSet};
