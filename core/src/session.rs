use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Lifecycle of a round. `Won` and `Lost` are left only through [`Session::restart`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Ready,
    Playing,
    Won,
    Lost,
}

impl SessionState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Everything an open changed, in the order it was opened, including the end-of-round reveal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResult {
    pub cells: Vec<Opened>,
    pub outcome: RevealOutcome,
    pub state: SessionState,
}

impl RevealResult {
    fn unchanged(state: SessionState) -> Self {
        Self {
            cells: Vec::new(),
            outcome: RevealOutcome::NoChange,
            state,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagResult {
    pub flagged: bool,
    pub flags_remaining: CellCount,
    pub state: SessionState,
}

/// Read-only copy of a session for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub side: Coord,
    pub mine_total: CellCount,
    pub flags_remaining: CellCount,
    pub opened_count: CellCount,
    pub state: SessionState,
    pub elapsed_seconds: u32,
    pub triggered_mine: Option<Coord2>,
    pub cells: Array2<Cell>,
}

impl Snapshot {
    pub fn cell(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn view(&self, coords: Coord2) -> Option<CellView> {
        let cell = self.cell(coords)?;
        Some(if cell.flagged {
            if self.state == SessionState::Lost && !cell.is_mine {
                CellView::WrongFlag
            } else {
                CellView::Flagged
            }
        } else if !cell.opened {
            CellView::Hidden
        } else if cell.is_mine {
            if self.triggered_mine == Some(coords) {
                CellView::Exploded
            } else {
                CellView::Mine
            }
        } else {
            CellView::Open(cell.adjacent)
        })
    }
}

/// One live game: the board, the flag budget, the lifecycle state and the clock.
///
/// Moves never fail. Anything that does not apply to the current state or target cell is reported as a no-op.
#[derive(Debug)]
pub struct Session<P = RandomPlacer> {
    config: GameConfig,
    board: Board,
    placer: P,
    flags_remaining: CellCount,
    state: SessionState,
    clock: Clock,
    mines_placed: bool,
    triggered_mine: Option<Coord2>,
}

impl Session<RandomPlacer> {
    /// Starts a round with random layouts drawn from `seed`.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_placer(config, RandomPlacer::new(seed))
    }
}

impl Session<FixedLayout> {
    /// Starts a round on a fixed layout. Restarts reuse the same layout.
    pub fn with_mines(side: Coord, mines: &[Coord2]) -> Result<Self> {
        let board = Board::from_mine_coords(side, mines)?;
        let config = GameConfig::new(side, board.mine_total())?;
        Ok(Self::from_parts(config, board, FixedLayout::new(mines), true))
    }
}

impl<P: MinePlacer> Session<P> {
    /// Starts a round with layouts from `placer`. Fails when the placer cannot lay out `config.mines` mines.
    pub fn with_placer(config: GameConfig, placer: P) -> Result<Self> {
        let board = Board::new(config.side, config.mines)?;
        placer.check(&board)?;
        let mut session = Self::from_parts(config, board, placer, false);
        session.place_unless_delayed()?;
        Ok(session)
    }

    fn from_parts(config: GameConfig, board: Board, placer: P, mines_placed: bool) -> Self {
        Self {
            flags_remaining: config.mines,
            config,
            board,
            placer,
            state: SessionState::Ready,
            clock: Clock::new(),
            mines_placed,
            triggered_mine: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn flags_remaining(&self) -> CellCount {
        self.flags_remaining
    }

    pub fn opened_count(&self) -> CellCount {
        self.board.opened_count()
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.clock.elapsed_seconds()
    }

    /// Handle for the one-second tick source.
    pub fn ticker(&self) -> Ticker {
        self.clock.ticker()
    }

    /// Opens a cell, flooding through zero-adjacency regions.
    pub fn open(&mut self, coords: Coord2) -> RevealResult {
        if self.state.is_finished() || !self.board.can_open(coords) {
            return RevealResult::unchanged(self.state);
        }

        if !self.mines_placed {
            if let Err(err) = self.placer.place(&mut self.board, Some(coords)) {
                log::warn!("Mine placement failed, ignoring open at {:?}: {}", coords, err);
                return RevealResult::unchanged(self.state);
            }
            self.mines_placed = true;
        }

        let mut cells = Vec::new();
        let Some(first) = self.board.flood_open(coords, &mut cells) else {
            return RevealResult::unchanged(self.state);
        };
        log::debug!("Open cell at {:?}, {} cells opened", coords, cells.len());
        self.mark_started();

        let outcome = if first.is_mine {
            self.triggered_mine = Some(coords);
            self.end_round(false, &mut cells);
            RevealOutcome::HitMine
        } else if self.board.is_won() {
            self.end_round(true, &mut cells);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        };

        RevealResult {
            cells,
            outcome,
            state: self.state,
        }
    }

    /// Places or removes a flag. `None` when refused, including a new flag with no budget left.
    ///
    /// With flag completion enabled, placing the last available flag wins the round when every flag sits on a mine.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Option<FlagResult> {
        if self.state.is_finished() {
            return None;
        }

        let cell = self.board.cell(coords)?;
        if cell.opened {
            return None;
        }
        if !cell.flagged && self.flags_remaining == 0 {
            log::debug!("Flag refused at {:?}, no flags remaining", coords);
            return None;
        }

        let flagged = self.board.toggle_flag(coords)?;
        if flagged {
            self.flags_remaining -= 1;
        } else {
            self.flags_remaining += 1;
        }

        if flagged
            && self.config.flag_completion
            && self.flags_remaining == 0
            && self.mines_placed
            && self.board.flags_on_mines_only()
        {
            log::debug!("All mines flagged");
            self.end_round(true, &mut Vec::new());
        }

        Some(FlagResult {
            flagged,
            flags_remaining: self.flags_remaining,
            state: self.state,
        })
    }

    /// New layout, full counters, clock at zero, back to `Ready`.
    ///
    /// On a placement error the round stays `Ready` with no mines laid out.
    pub fn restart(&mut self) -> Result<()> {
        self.board.reset();
        self.flags_remaining = self.config.mines;
        self.state = SessionState::Ready;
        self.triggered_mine = None;
        self.clock.reset();
        self.mines_placed = false;
        self.place_unless_delayed()?;
        log::debug!("Round restarted");
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            side: self.board.side(),
            mine_total: self.board.mine_total(),
            flags_remaining: self.flags_remaining,
            opened_count: self.board.opened_count(),
            state: self.state,
            elapsed_seconds: self.clock.elapsed_seconds(),
            triggered_mine: self.triggered_mine,
            cells: self.board.cells().clone(),
        }
    }

    fn place_unless_delayed(&mut self) -> Result<()> {
        if !self.config.first_move.delays_placement() {
            self.placer.place(&mut self.board, None)?;
            self.mines_placed = true;
        }
        Ok(())
    }

    fn mark_started(&mut self) {
        if self.state.is_ready() {
            self.state = SessionState::Playing;
            self.clock.start();
            log::debug!("Round started");
        }
    }

    /// Stops the clock, settles the state and reveals the board before anything is reported.
    fn end_round(&mut self, won: bool, cells: &mut Vec<Opened>) {
        if self.state.is_finished() {
            return;
        }

        self.clock.stop();
        self.state = if won {
            SessionState::Won
        } else {
            SessionState::Lost
        };
        cells.extend(self.board.reveal_all(won));
        self.flags_remaining = self.config.mines.saturating_sub(self.board.flag_count());
        log::debug!(
            "Round ended {:?} after {}s",
            self.state,
            self.clock.elapsed_seconds()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(side: Coord, mines: &[Coord2]) -> Session<FixedLayout> {
        Session::with_mines(side, mines).unwrap()
    }

    #[test]
    fn new_session_rejects_bad_config() {
        assert_eq!(
            Session::new(GameConfig::new_unchecked(4, 16), 0).err(),
            Some(GameError::TooManyMines {
                mines: 16,
                cells: 16
            })
        );
        assert_eq!(
            Session::new(GameConfig::new_unchecked(0, 1), 0).err(),
            Some(GameError::ZeroSide)
        );
        assert_eq!(
            Session::with_mines(2, &[(0, 0), (0, 1), (1, 0), (1, 1)]).err(),
            Some(GameError::TooManyMines { mines: 4, cells: 4 })
        );
    }

    #[test]
    fn fresh_session_is_ready_with_full_budget() {
        let session = Session::new(GameConfig::STANDARD, 5).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.flags_remaining(), 40);
        assert_eq!(session.opened_count(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        let mines = session
            .board()
            .cells()
            .iter()
            .filter(|cell| cell.is_mine)
            .count();
        assert_eq!(mines, 40);
    }

    #[test]
    fn first_open_starts_playing_and_clock() {
        let mut session = session(4, &[(0, 0), (3, 3)]);
        let result = session.open((1, 1));

        assert_eq!(result.outcome, RevealOutcome::Revealed);
        assert_eq!(result.state, SessionState::Playing);
        assert_eq!(
            result.cells,
            [Opened {
                coords: (1, 1),
                is_mine: false,
                adjacent: 1
            }]
        );
        assert!(session.clock().is_running());
    }

    #[test]
    fn fixed_scenario_counts_and_flood() {
        let mut session = session(4, &[(0, 0), (3, 3)]);

        assert_eq!(session.open((1, 1)).cells[0].adjacent, 1);
        assert_eq!(session.open((0, 1)).cells[0].adjacent, 1);
        assert_eq!(session.open((2, 2)).cells[0].adjacent, 1);

        let result = session.open((0, 2));
        assert_eq!(result.cells[0].adjacent, 0);
        assert_eq!(result.outcome, RevealOutcome::Won);
        assert!(
            result
                .cells
                .iter()
                .all(|opened| opened.coords != (0, 0) && opened.coords != (3, 3))
        );

        let snapshot = session.snapshot();
        assert_eq!(snapshot.opened_count, 14);
        assert_eq!(snapshot.view((0, 0)), Some(CellView::Flagged));
        assert_eq!(snapshot.view((3, 3)), Some(CellView::Flagged));
        assert_eq!(snapshot.flags_remaining, 0);
    }

    #[test]
    fn hitting_a_mine_loses_and_reveals() {
        let mut session = session(3, &[(0, 0), (2, 2)]);
        session.toggle_flag((2, 2)).unwrap();
        session.toggle_flag((1, 2)).unwrap();
        session.open((0, 1));

        let result = session.open((0, 0));

        assert_eq!(result.outcome, RevealOutcome::HitMine);
        assert_eq!(session.state(), SessionState::Lost);
        assert!(!session.clock().is_running());
        assert_eq!(session.triggered_mine(), Some((0, 0)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.view((0, 0)), Some(CellView::Exploded));
        assert_eq!(snapshot.view((2, 2)), Some(CellView::Flagged));
        assert_eq!(snapshot.view((1, 2)), Some(CellView::WrongFlag));
        assert_eq!(snapshot.view((1, 1)), Some(CellView::Open(2)));
        for y in 0..3 {
            for x in 0..3 {
                let cell = snapshot.cell((y, x)).unwrap();
                assert!(cell.opened || cell.flagged);
            }
        }
    }

    #[test]
    fn win_requires_only_safe_cells_open() {
        let mut session = session(3, &[(1, 1)]);
        for y in 0..3 {
            for x in 0..3 {
                if (y, x) == (1, 1) {
                    continue;
                }
                assert!(!session.is_finished());
                session.open((y, x));
            }
        }
        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.opened_count(), 8);
        assert!(!session.clock().is_running());
    }

    #[test]
    fn win_does_not_depend_on_flag_state() {
        for flag_mine in [false, true] {
            let mut session = session(3, &[(1, 1)]);
            if flag_mine {
                assert!(session.toggle_flag((1, 1)).unwrap().flagged);
                assert_eq!(session.state(), SessionState::Ready);
            }
            for (y, x) in [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)] {
                session.open((y, x));
            }
            assert_eq!(session.state(), SessionState::Playing);
            let result = session.open((2, 2));
            assert_eq!(result.outcome, RevealOutcome::Won);
            assert!(session.board()[(1, 1)].flagged);
        }
    }

    #[test]
    fn moves_after_round_end_are_noops() {
        let mut session = session(3, &[(0, 0)]);
        session.open((0, 0));
        let before = session.snapshot();

        assert_eq!(session.open((2, 2)).outcome, RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((1, 1)), None);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn open_and_flag_on_invalid_targets_are_noops() {
        let mut session = session(4, &[(0, 0), (3, 3)]);
        let before = session.snapshot();

        assert_eq!(session.open((4, 0)).outcome, RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((0, 9)), None);
        assert_eq!(session.snapshot(), before);

        session.toggle_flag((1, 1)).unwrap();
        assert_eq!(session.open((1, 1)).outcome, RevealOutcome::NoChange);
        assert_eq!(session.state(), SessionState::Ready);

        session.open((0, 1));
        assert_eq!(session.open((0, 1)).outcome, RevealOutcome::NoChange);
        assert_eq!(session.toggle_flag((0, 1)), None);
    }

    #[test]
    fn flag_budget_is_capped() {
        let mut session = session(4, &[(0, 0), (3, 3)]);
        assert_eq!(
            session.toggle_flag((1, 1)),
            Some(FlagResult {
                flagged: true,
                flags_remaining: 1,
                state: SessionState::Ready
            })
        );
        session.toggle_flag((1, 2)).unwrap();
        assert_eq!(session.flags_remaining(), 0);
        assert_eq!(session.toggle_flag((2, 2)), None);
        assert!(!session.board()[(2, 2)].flagged);

        let removed = session.toggle_flag((1, 1)).unwrap();
        assert!(!removed.flagged);
        assert_eq!(removed.flags_remaining, 1);
        assert_eq!(session.state(), SessionState::Ready);
    }

    fn flag_completion_session() -> Session<FixedLayout> {
        let config = GameConfig::new(4, 2).unwrap().with_flag_completion(true);
        Session::with_placer(config, FixedLayout::new(&[(0, 0), (3, 3)])).unwrap()
    }

    #[test]
    fn flagging_every_mine_wins_with_flag_completion() {
        let mut session = flag_completion_session();
        session.open((1, 1));
        session.toggle_flag((0, 0)).unwrap();
        let result = session.toggle_flag((3, 3)).unwrap();

        assert_eq!(result.state, SessionState::Won);
        assert_eq!(result.flags_remaining, 0);
        assert!(!session.clock().is_running());
        assert_eq!(session.opened_count(), 14);
    }

    #[test]
    fn wrong_flags_at_zero_budget_do_not_win() {
        let mut session = flag_completion_session();
        session.toggle_flag((0, 0)).unwrap();
        let result = session.toggle_flag((2, 2)).unwrap();
        assert_eq!(result.state, SessionState::Ready);
    }

    #[test]
    fn flags_alone_never_win_by_default() {
        let mut session = session(4, &[(0, 0), (3, 3)]);
        session.toggle_flag((0, 0)).unwrap();
        let result = session.toggle_flag((3, 3)).unwrap();
        assert_eq!(result.state, SessionState::Ready);
        assert_eq!(result.flags_remaining, 0);
    }

    #[test]
    fn ticks_after_round_end_are_ignored() {
        let mut session = session(4, &[(0, 0), (3, 3)]);
        let ticker = session.ticker();
        session.open((1, 1));
        ticker.tick();
        ticker.tick();
        assert_eq!(session.elapsed_seconds(), 2);

        session.open((0, 0));
        assert!(!ticker.tick());
        assert_eq!(session.snapshot().elapsed_seconds, 2);
    }

    #[test]
    fn restart_resets_everything() {
        let mut session = Session::new(GameConfig::new(8, 10).unwrap(), 11).unwrap();
        let ticker = session.ticker();
        let safe = session
            .board()
            .cells()
            .indexed_iter()
            .find(|(_, cell)| !cell.is_mine && !cell.opened)
            .map(|((y, x), _)| (y as Coord, x as Coord))
            .unwrap();
        session.open(safe);
        ticker.tick();
        let flag_target = session
            .board()
            .cells()
            .indexed_iter()
            .find(|(_, cell)| !cell.opened)
            .map(|((y, x), _)| (y as Coord, x as Coord))
            .unwrap();
        session.toggle_flag(flag_target);

        session.restart().unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.opened_count(), 0);
        assert_eq!(session.flags_remaining(), 10);
        assert_eq!(session.elapsed_seconds(), 0);
        assert_eq!(session.triggered_mine(), None);
        assert_eq!(session.board().flag_count(), 0);
        let mines = session
            .board()
            .cells()
            .iter()
            .filter(|cell| cell.is_mine)
            .count();
        assert_eq!(mines, 10);

        // the old ticker still drives the new round
        let safe = session
            .board()
            .cells()
            .indexed_iter()
            .find(|(_, cell)| !cell.is_mine)
            .map(|((y, x), _)| (y as Coord, x as Coord))
            .unwrap();
        session.open(safe);
        if !session.is_finished() {
            ticker.tick();
            assert_eq!(session.elapsed_seconds(), 1);
        }
    }

    #[test]
    fn restart_after_loss_allows_play_again() {
        let mut session = session(3, &[(0, 0)]);
        session.open((0, 0));
        assert_eq!(session.state(), SessionState::Lost);

        session.restart().unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.board()[(0, 0)].is_mine);
        assert_eq!(session.open((1, 1)).state, SessionState::Playing);
    }

    #[test]
    fn safe_first_move_never_loses_on_first_open() {
        let config = GameConfig::new(4, 15)
            .unwrap()
            .with_first_move(FirstMove::Safe);
        for seed in 0..20 {
            let mut session = Session::new(config, seed).unwrap();
            assert!(
                session
                    .board()
                    .cells()
                    .iter()
                    .all(|cell| !cell.is_mine)
            );
            let result = session.open((2, 1));
            assert_eq!(result.outcome, RevealOutcome::Won);
            assert!(!session.board()[(2, 1)].is_mine);
        }
    }

    #[test]
    fn safe_first_move_delays_placement_again_after_restart() {
        let config = GameConfig::new(5, 5)
            .unwrap()
            .with_first_move(FirstMove::Safe);
        let mut session = Session::new(config, 8).unwrap();
        session.open((0, 0));
        session.restart().unwrap();
        assert_eq!(
            session
                .board()
                .cells()
                .iter()
                .filter(|cell| cell.is_mine)
                .count(),
            0
        );
        assert!(session.open((4, 4)).outcome.has_update());
        assert!(!session.board()[(4, 4)].is_mine);
    }

    #[test]
    fn layout_not_matching_mine_count_is_rejected() {
        let config = GameConfig::new(3, 2).unwrap();
        for first_move in [FirstMove::Unprotected, FirstMove::Safe] {
            let config = config.with_first_move(first_move);
            assert_eq!(
                Session::with_placer(config, FixedLayout::new(&[(0, 0)])).err(),
                Some(GameError::LayoutMismatch {
                    expected: 2,
                    placed: 1
                })
            );
            assert_eq!(
                Session::with_placer(config, FixedLayout::new(&[(0, 0), (0, 0)])).err(),
                Some(GameError::LayoutMismatch {
                    expected: 2,
                    placed: 1
                })
            );
            assert_eq!(
                Session::with_placer(config, FixedLayout::new(&[(0, 0), (3, 0)])).err(),
                Some(GameError::InvalidCoords)
            );
        }
    }

    #[test]
    fn matching_fixed_layout_can_be_won() {
        let config = GameConfig::new(3, 2).unwrap();
        let layout = FixedLayout::new(&[(0, 0), (2, 2)]);
        let mut session = Session::with_placer(config, layout).unwrap();
        for y in 0..3 {
            for x in 0..3 {
                if !session.board()[(y, x)].is_mine {
                    session.open((y, x));
                }
            }
        }
        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.opened_count(), session.board().safe_cell_count());
    }

    /// Lays out its layout once, then runs dry.
    struct OneShot(Option<FixedLayout>);

    impl MinePlacer for OneShot {
        fn place(&mut self, board: &mut Board, safe: Option<Coord2>) -> Result<()> {
            match self.0.take() {
                Some(mut layout) => layout.place(board, safe),
                None => Err(GameError::InvalidCoords),
            }
        }
    }

    #[test]
    fn placement_failure_on_restart_is_reported() {
        let config = GameConfig::new(3, 1).unwrap();
        let placer = OneShot(Some(FixedLayout::new(&[(0, 0)])));
        let mut session = Session::with_placer(config, placer).unwrap();
        session.open((0, 0));
        assert_eq!(session.state(), SessionState::Lost);

        assert_eq!(session.restart(), Err(GameError::InvalidCoords));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.open((1, 1)).outcome, RevealOutcome::NoChange);
        assert_eq!(session.opened_count(), 0);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let session = session(2, &[(0, 0)]);
        let json = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(json["side"], 2);
        assert_eq!(json["mine_total"], 1);
        assert_eq!(json["state"], "Ready");
        assert_eq!(json["triggered_mine"], serde_json::Value::Null);
        assert_eq!(json["cells"]["dim"], serde_json::json!([2, 2]));
    }
}
