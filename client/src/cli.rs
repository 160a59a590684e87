use std::{io, ops::ControlFlow, time::Duration};

use anyhow::{Context, bail};
use liblife::{ControllerState, Pattern, Position, Preset, RuleSet};
use log::{error, warn};

use crate::{State, renderer::describe_rule};

pub fn run_cli(state: &mut State) {
    for line_res in io::stdin().lines() {
        let line = match line_res {
            Ok(line) => line,
            Err(e) => {
                error!("reading stdin: {e}");
                break;
            }
        };

        let args = line.split_whitespace();

        match handle_cmd(state, args) {
            Ok(ControlFlow::Continue(())) => println!("OK"),
            Ok(ControlFlow::Break(())) => break,
            Err(e) => {
                warn!("command {line:?} failed");
                eprintln!("! {e:?}");
            }
        }
    }

    state.controller.pause();
}

fn handle_cmd<'a, I>(state: &mut State, mut args: I) -> anyhow::Result<ControlFlow<()>>
where
    I: Iterator<Item = &'a str>,
{
    let controller = &mut state.controller;

    match args.next().context("No command")? {
        "step" => {
            let times = args.next().unwrap_or("1").parse::<usize>()?;
            controller.step(times);
        }

        "run" | "start" => {
            let period = match args.next() {
                Some(millis) => Duration::from_millis(millis.parse::<u64>()?),
                None => controller.period(),
            };

            if controller.state() == ControllerState::Running {
                controller.set_period(period);
            } else {
                controller.start(period);
            }
        }

        "pause" | "stop" => {
            controller.pause();
        }

        "clear" => {
            controller.clear();
        }

        "random" => {
            match args.next() {
                Some(density) => controller.randomize_density(density.parse::<f64>()?)?,
                None => controller.randomize()?,
            }
        }

        "resize" => {
            let cols = args.next().context("missing cols")?.parse::<usize>()?;
            let rows = args.next().context("missing rows")?.parse::<usize>()?;

            state.rebuild_board(cols, rows)?;
        }

        "rule" => {
            let name = args.next().context("missing rule name or notation")?;

            let rule = if name.contains('/') {
                let rule = name.parse::<RuleSet>()?;
                controller.set_strategy(rule);
                rule
            } else {
                controller.set_strategy_by_name(name)?
            };

            println!("rule is now {}", describe_rule(rule));
        }

        "rules" => {
            for preset in Preset::all() {
                println!("{preset}: {}", preset.rule());
            }
        }

        "toggle" => {
            let pos = parse_position(&mut args)?;

            controller
                .with_board_mut(|board| board.toggle(pos))
                .context("No board")??;
        }

        "place" => {
            let pattern = args.next().context("missing pattern")?.parse::<Pattern>()?;
            let pos = parse_position(&mut args)?;

            controller
                .with_board_mut(|board| board.stamp(pattern, pos))
                .context("No board")??;
        }

        "show" => {
            controller.with_board(|board| board.notify());
        }

        "status" => {
            let (cols, rows, population) = controller
                .with_board(|board| (board.cols(), board.rows(), board.population()))
                .context("No board")?;

            println!(
                "{:?}, every {:?}, rule {}, {cols}x{rows}, generation {}, population {population}",
                controller.state(),
                controller.period(),
                describe_rule(controller.rule()),
                controller.generation().unwrap_or_default(),
            );
        }

        "exit" | "quit" => {
            return Ok(ControlFlow::Break(()));
        }

        _ => bail!("Unknown command"),
    }

    Ok(ControlFlow::Continue(()))
}

fn parse_position<'a, I>(args: &mut I) -> anyhow::Result<Position>
where
    I: Iterator<Item = &'a str>,
{
    let x = args.next().context("missing x")?.parse::<usize>()?;
    let y = args.next().context("missing y")?.parse::<usize>()?;
    Ok(Position { x, y })
}
