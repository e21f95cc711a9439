use std::fmt;

use sweeper_core::{CellView, SessionState, Snapshot};

/// Three-digit counter, zero padded like a classic seven-segment display.
pub fn format_for_counter(value: i32) -> String {
    let value = value.clamp(-99, 999);
    if value < 0 {
        format!("-{:02}", -value)
    } else {
        format!("{:03}", value)
    }
}

const fn glyph(view: CellView) -> char {
    use CellView::*;
    match view {
        Hidden => '#',
        Flagged => 'F',
        Open(0) => '.',
        Open(n) => (b'0' + n) as char,
        Mine => '*',
        Exploded => 'X',
        WrongFlag => '!',
    }
}

/// Text rendering of a snapshot: counters on top, then the grid with row and column indices.
pub struct BoardView<'a>(pub &'a Snapshot);

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        let face = match snapshot.state {
            SessionState::Ready | SessionState::Playing => ":)",
            SessionState::Won => "B)",
            SessionState::Lost => "X(",
        };
        writeln!(
            f,
            "{}  {}  {}",
            format_for_counter(snapshot.flags_remaining.into()),
            face,
            format_for_counter(snapshot.elapsed_seconds.try_into().unwrap_or(i32::MAX)),
        )?;

        write!(f, "   ")?;
        for x in 0..snapshot.side {
            write!(f, "{:>3}", x)?;
        }
        writeln!(f)?;

        for y in 0..snapshot.side {
            write!(f, "{:>3}", y)?;
            for x in 0..snapshot.side {
                let view = snapshot.view((y, x)).unwrap_or_default();
                write!(f, "{:>3}", glyph(view))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
