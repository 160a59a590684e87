use std::env;

use anyhow::Context;
use config::Config;
use liblife::{Board, Controller};
use log::info;
use renderer::TerminalRenderer;

mod cli;
mod config;
mod renderer;

pub struct State {
    controller: Controller,
    renderer: TerminalRenderer,
}

impl State {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut state = Self {
            controller: Controller::new(config.controller),
            renderer: TerminalRenderer::new(config.color),
        };

        state.rebuild_board(config.cols, config.rows)?;
        Ok(state)
    }

    /// Throws the current board away and binds a fresh, empty one with the renderer attached.
    pub fn rebuild_board(&mut self, cols: usize, rows: usize) -> anyhow::Result<()> {
        let mut board = Board::builder()
            .cols(cols)
            .rows(rows)
            .build()
            .context("Building board")?;

        board.subscribe(self.renderer.subscriber());
        self.controller.init(board);
        self.controller.with_board(Board::notify);

        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match env::args().nth(1) {
        Some(config_path) => Config::load(config_path)?,
        None => Config::default(),
    };
    info!("starting with {config:?}");

    let mut state = State::new(config)?;
    cli::run_cli(&mut state);

    Ok(())
}
