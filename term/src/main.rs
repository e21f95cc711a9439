use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use sweeper_core::{FirstMove, GameConfig, RevealOutcome, Session, SessionState, Ticker};

use crate::command::{Command, HELP};
use crate::render::BoardView;

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Cells per board edge
    #[arg(long, default_value_t = GameConfig::STANDARD.side)]
    side: u8,

    /// Number of mines
    #[arg(long, default_value_t = GameConfig::STANDARD.mines)]
    mines: u16,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Lay out mines on the first open so it can never hit one
    #[arg(long)]
    safe_start: bool,

    /// Also win by flagging every mine
    #[arg(long)]
    flag_completion: bool,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let first_move = if self.safe_start {
            FirstMove::Safe
        } else {
            FirstMove::Unprotected
        };
        let config = GameConfig::new(self.side, self.mines).with_context(|| {
            format!("cannot play {} mines on a {1}x{1} board", self.mines, self.side)
        })?;
        Ok(config
            .with_first_move(first_move)
            .with_flag_completion(self.flag_completion))
    }
}

/// Drives the clock from a detached thread, once per second.
fn spawn_ticker(ticker: Ticker) {
    thread::spawn(move || {
        loop {
            thread::sleep(Duration::from_secs(1));
            ticker.tick();
        }
    });
}

fn apply(session: &mut Session, command: Command, out: &mut impl Write) -> io::Result<()> {
    match command {
        Command::Open((y, x)) => {
            let result = session.open((y, x));
            if result.outcome == RevealOutcome::NoChange {
                writeln!(out, "Nothing to open at {} {}", y, x)?;
            }
        }
        Command::Flag((y, x)) => {
            if session.toggle_flag((y, x)).is_none() {
                writeln!(out, "Cannot flag {} {}", y, x)?;
            }
        }
        Command::Restart => {
            if let Err(err) = session.restart() {
                writeln!(out, "Cannot restart: {}", err)?;
                return Ok(());
            }
        }
        Command::Help | Command::Quit => {
            writeln!(out, "{}", HELP)?;
            return Ok(());
        }
    }

    let snapshot = session.snapshot();
    write!(out, "{}", BoardView(&snapshot))?;
    match snapshot.state {
        SessionState::Won => writeln!(
            out,
            "Congrats! You won in {} seconds. Type r to play again.",
            snapshot.elapsed_seconds
        ),
        SessionState::Lost => writeln!(out, "Game over. Type r to restart."),
        SessionState::Ready | SessionState::Playing => Ok(()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .format_timestamp(None)
        .init();

    let config = args.game_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("config: {:?}, seed: {}", config, seed);

    let mut session = Session::new(config, seed)?;
    spawn_ticker(session.ticker());

    let mut out = io::stdout().lock();
    writeln!(out, "{}", HELP)?;
    write!(out, "{}", BoardView(&session.snapshot()))?;
    out.flush()?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read command")?;
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => apply(&mut session, command, &mut out)?,
            Err(err) => writeln!(out, "{}", err)?,
        }
        out.flush()?;
    }

    log::debug!("Bye");
    Ok(())
}
