use std::str::FromStr;

use sweeper_core::Coord2;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  o Y X   open the cell at row Y, column X
  f Y X   place or remove a flag
  r       restart with a new layout
  h       show this help
  q       quit";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Open(Coord2),
    Flag(Coord2),
    Restart,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("Empty command, type h for help")]
    Empty,
    #[error("Unknown command {0:?}, type h for help")]
    Unknown(String),
    #[error("Expected a row and a column, e.g. `{0} 3 4`")]
    MissingCoords(char),
    #[error("Invalid coordinate {0:?}")]
    InvalidCoord(String),
    #[error("Unexpected trailing input {0:?}")]
    Trailing(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ParseCommandError::Empty)?;

        let command = match verb.to_ascii_lowercase().as_str() {
            "o" | "open" => Command::Open(parse_coords(&mut words, 'o')?),
            "f" | "flag" => Command::Flag(parse_coords(&mut words, 'f')?),
            "r" | "restart" => Command::Restart,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            _ => return Err(ParseCommandError::Unknown(verb.to_owned())),
        };

        match words.next() {
            Some(extra) => Err(ParseCommandError::Trailing(extra.to_owned())),
            None => Ok(command),
        }
    }
}

fn parse_coords<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    verb: char,
) -> Result<Coord2, ParseCommandError> {
    let mut next = || -> Result<u8, ParseCommandError> {
        let word = words.next().ok_or(ParseCommandError::MissingCoords(verb))?;
        word.parse()
            .map_err(|_| ParseCommandError::InvalidCoord(word.to_owned()))
    };
    let y = next()?;
    let x = next()?;
    Ok((y, x))
}
