//! The board: a fixed grid of cells plus the log of moves that filled it.
//!
//! Row 0 is the TOP row, row `ROWS - 1` the bottom. Marks fall with
//! gravity, so a column's occupied cells are always contiguous from the
//! bottom, and a cell that has been filled never changes again.
//!
//! ```text
//!        col: 0 1 2 3 4 5 6
//!   row 0     . . . . . . .
//!   row 1     . . . . . . .
//!   row 2     . . . . . . .
//!   row 3     . . . A . . .
//!   row 4     . . B A . . .
//!   row 5     . A B A B . .   ← marks land here first
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RuleError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of rows on the board.
pub const ROWS: usize = 6;

/// Number of columns on the board.
pub const COLUMNS: usize = 7;

/// How many contiguous marks make a win.
pub const CONNECT: usize = 4;

/// Score returned by [`Board::score_candidate`] when the placement wins.
/// Larger than any positional score.
pub const IMMEDIATE_WIN: i32 = 10_000;

/// Score returned by [`Board::score_candidate`] when the placement takes
/// the cell the opposing mark needs to win.
pub const IMMEDIATE_BLOCK: i32 = 8_000;

/// The four scan axes as (row step, column step): horizontal, vertical,
/// diagonal ↘ and diagonal ↙. Each is walked in both directions.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

// ---------------------------------------------------------------------------
// Mark
// ---------------------------------------------------------------------------

/// One of the two marks that can occupy a cell.
///
/// Participant A always plays `A` and moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    A,
    B,
}

impl Mark {
    /// The opposing mark.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// A single cell: empty (`None`) or holding a mark.
pub type Cell = Option<Mark>;

// ---------------------------------------------------------------------------
// Move / Placement / Terminal
// ---------------------------------------------------------------------------

/// A recorded move. Immutable once appended to the board's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// 1-based position in the move log.
    pub seq: u32,
    pub column: usize,
    /// The row the mark landed in.
    pub row: usize,
    pub mark: Mark,
}

/// Why the board reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    /// The move completed four in a row for its mark.
    Win,
    /// The move filled the last empty cell without winning.
    Draw,
}

/// The result of a successful [`Board::apply_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The row the mark landed in.
    pub row: usize,
    /// `Some` if this move ended the game.
    pub terminal: Option<Terminal>,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// The raw cell matrix, without a move log.
///
/// `Grid` is `Copy` (42 one-byte cells), which is what makes
/// candidate scoring cheap: we copy the grid, drop a mark into the copy,
/// and inspect it. The real board is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: [[Cell; COLUMNS]; ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cells: [[None; COLUMNS]; ROWS],
        }
    }
}

impl Grid {
    /// Returns the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[[Cell; COLUMNS]; ROWS] {
        &self.cells
    }

    /// The row a mark dropped into `col` would land in.
    ///
    /// # Errors
    /// - [`RuleError::ColumnOutOfRange`] if `col >= COLUMNS`
    /// - [`RuleError::ColumnFull`] if the top cell is occupied
    pub fn landing_row(&self, col: usize) -> Result<usize, RuleError> {
        if col >= COLUMNS {
            return Err(RuleError::ColumnOutOfRange { column: col });
        }
        (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col].is_none())
            .ok_or(RuleError::ColumnFull { column: col })
    }

    /// Returns `true` if `col` can accept another mark.
    pub fn is_playable(&self, col: usize) -> bool {
        col < COLUMNS && self.cells[0][col].is_none()
    }

    /// Returns `true` when every column's top cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(Option::is_some)
    }

    /// Checks for `CONNECT` in a row through `(row, col)` only.
    ///
    /// For each axis we count the placed cell itself plus the contiguous
    /// run of `mark` extending in both directions.
    pub fn wins_at(&self, row: usize, col: usize, mark: Mark) -> bool {
        AXES.iter()
            .any(|&(dr, dc)| self.run_length(row, col, mark, dr, dc) >= CONNECT)
    }

    /// Number of the 8 neighbouring cells of `(row, col)` holding `mark`.
    pub fn adjacent_count(&self, row: usize, col: usize, mark: Mark) -> usize {
        let mut count = 0;
        for dr in -1..=1 {
            for dc in -1..=1 {
                if (dr, dc) == (0, 0) {
                    continue;
                }
                if self.mark_at(row as isize + dr, col as isize + dc)
                    == Some(mark)
                {
                    count += 1;
                }
            }
        }
        count
    }

    /// Drops `mark` into `col` and returns the landing row.
    fn drop_mark(&mut self, col: usize, mark: Mark) -> Result<usize, RuleError> {
        let row = self.landing_row(col)?;
        self.cells[row][col] = Some(mark);
        Ok(row)
    }

    fn run_length(
        &self,
        row: usize,
        col: usize,
        mark: Mark,
        dr: isize,
        dc: isize,
    ) -> usize {
        let mut count = 1;
        for sign in [1, -1] {
            let (step_r, step_c) = (dr * sign, dc * sign);
            let mut r = row as isize + step_r;
            let mut c = col as isize + step_c;
            while self.mark_at(r, c) == Some(mark) {
                count += 1;
                r += step_r;
                c += step_c;
            }
        }
        count
    }

    fn mark_at(&self, row: isize, col: isize) -> Cell {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Some(Mark::A) => 'A',
                    Some(Mark::B) => 'B',
                    None => '.',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A game board: the grid plus the ordered log of moves.
///
/// Each session owns exactly one `Board`. There is no shared or global
/// board state anywhere in the system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    grid: Grid,
    moves: Vec<Move>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `mark` in the lowest empty cell of `column`.
    ///
    /// Win detection runs on the placed cell only; the draw check runs
    /// only if that move did not win.
    ///
    /// # Errors
    /// [`RuleError::ColumnOutOfRange`] or [`RuleError::ColumnFull`]. The
    /// board is unchanged in both cases.
    pub fn apply_move(
        &mut self,
        column: usize,
        mark: Mark,
    ) -> Result<Placement, RuleError> {
        let row = self.grid.drop_mark(column, mark)?;
        self.moves.push(Move {
            seq: self.moves.len() as u32 + 1,
            column,
            row,
            mark,
        });

        let terminal = if self.detect_win(row, column, mark) {
            Some(Terminal::Win)
        } else if self.is_full() {
            Some(Terminal::Draw)
        } else {
            None
        };

        Ok(Placement { row, terminal })
    }

    /// Returns `true` if `mark` has four in a row through `(row, col)`.
    pub fn detect_win(&self, row: usize, col: usize, mark: Mark) -> bool {
        self.grid.wins_at(row, col, mark)
    }

    /// Returns `true` when no column can accept another mark.
    pub fn is_full(&self) -> bool {
        self.grid.is_full()
    }

    /// Scores dropping `mark` into `column` without committing the move.
    ///
    /// - [`IMMEDIATE_WIN`] if the placement wins for `mark`
    /// - [`IMMEDIATE_BLOCK`] if the opposing mark would win by landing in
    ///   that same cell
    /// - otherwise a positional score: a center bonus
    ///   (`COLUMNS / 2 - |column - COLUMNS / 2|`) plus the number of
    ///   `mark` cells among the 8 neighbours of the landing cell
    ///
    /// # Errors
    /// Same as [`apply_move`](Self::apply_move) for an unplayable column.
    pub fn score_candidate(
        &self,
        column: usize,
        mark: Mark,
    ) -> Result<i32, RuleError> {
        let mut ours = self.grid;
        let row = ours.drop_mark(column, mark)?;
        if ours.wins_at(row, column, mark) {
            return Ok(IMMEDIATE_WIN);
        }

        let mut theirs = self.grid;
        theirs.drop_mark(column, mark.other())?;
        if theirs.wins_at(row, column, mark.other()) {
            return Ok(IMMEDIATE_BLOCK);
        }

        let center = COLUMNS / 2;
        let center_bonus = (center - center.abs_diff(column)) as i32;
        let adjacency = self.grid.adjacent_count(row, column, mark) as i32;
        Ok(center_bonus + adjacency)
    }

    /// Columns that can still accept a mark, ascending.
    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLUMNS).filter(|&col| self.grid.is_playable(col))
    }

    /// The cell at `(row, col)`.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.grid.get(row, col)
    }

    /// The underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The move log, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of moves applied so far.
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Plays `(column, mark)` pairs and returns the placement of the last.
    fn play(board: &mut Board, moves: &[(usize, Mark)]) -> Vec<Placement> {
        moves
            .iter()
            .map(|&(col, mark)| board.apply_move(col, mark).expect("legal move"))
            .collect()
    }

    /// Alternates A, B, A, ... over the given columns.
    fn alternating(columns: &[usize]) -> Vec<(usize, Mark)> {
        columns
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, if i % 2 == 0 { Mark::A } else { Mark::B }))
            .collect()
    }

    // =====================================================================
    // apply_move(): legality
    // =====================================================================

    #[test]
    fn test_apply_move_empty_column_lands_on_bottom_row() {
        let mut board = Board::new();

        let placement = board.apply_move(3, Mark::A).unwrap();

        assert_eq!(placement.row, ROWS - 1);
        assert_eq!(placement.terminal, None);
        assert_eq!(board.cell(ROWS - 1, 3), Some(Mark::A));
    }

    #[test]
    fn test_apply_move_stacks_upwards() {
        let mut board = Board::new();

        let placements = play(&mut board, &[(2, Mark::A), (2, Mark::B), (2, Mark::A)]);

        let rows: Vec<usize> = placements.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![5, 4, 3]);
    }

    #[test]
    fn test_apply_move_full_column_returns_error_and_leaves_board() {
        let mut board = Board::new();
        for i in 0..ROWS {
            let mark = if i % 2 == 0 { Mark::A } else { Mark::B };
            board.apply_move(0, mark).unwrap();
        }
        let before = board.clone();

        let result = board.apply_move(0, Mark::A);

        assert_eq!(result, Err(RuleError::ColumnFull { column: 0 }));
        assert_eq!(board, before, "board must not change on ColumnFull");
    }

    #[test]
    fn test_apply_move_out_of_range_returns_error_and_leaves_board() {
        let mut board = Board::new();
        board.apply_move(1, Mark::A).unwrap();
        let before = board.clone();

        let result = board.apply_move(COLUMNS, Mark::B);

        assert_eq!(result, Err(RuleError::ColumnOutOfRange { column: COLUMNS }));
        assert_eq!(board, before);
    }

    #[test]
    fn test_apply_move_records_sequence_numbers() {
        let mut board = Board::new();
        play(&mut board, &alternating(&[3, 4, 3]));

        let seqs: Vec<u32> = board.moves().iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(board.moves()[1], Move { seq: 2, column: 4, row: 5, mark: Mark::B });
    }

    // =====================================================================
    // Win detection
    // =====================================================================

    #[test]
    fn test_vertical_win_on_seventh_move() {
        let mut board = Board::new();

        let placements = play(&mut board, &alternating(&[0, 1, 0, 1, 0, 1, 0]));

        let (last, earlier) = placements.split_last().unwrap();
        assert!(earlier.iter().all(|p| p.terminal.is_none()));
        assert_eq!(last.terminal, Some(Terminal::Win));
        for row in 2..=5 {
            assert_eq!(board.cell(row, 0), Some(Mark::A));
        }
    }

    #[test]
    fn test_diagonal_win_only_on_completing_move() {
        // A ends up on (5,0), (4,1), (3,2), (2,3). B's fifth mark goes to
        // column 6 so B never gets four along the bottom row.
        let moves = [
            (0, Mark::A), (1, Mark::B), (1, Mark::A), (2, Mark::B),
            (2, Mark::A), (3, Mark::B), (2, Mark::A), (3, Mark::B),
            (3, Mark::A), (6, Mark::B), (3, Mark::A),
        ];
        let mut board = Board::new();

        let placements = play(&mut board, &moves);

        let (last, earlier) = placements.split_last().unwrap();
        assert!(
            earlier.iter().all(|p| p.terminal.is_none()),
            "no win before the diagonal is complete"
        );
        assert_eq!(last.row, 2);
        assert_eq!(last.terminal, Some(Terminal::Win));
        for (row, col) in [(5, 0), (4, 1), (3, 2), (2, 3)] {
            assert_eq!(board.cell(row, col), Some(Mark::A));
        }
    }

    #[test]
    fn test_bottom_row_four_is_a_horizontal_win() {
        let mut board = Board::new();
        let placements = play(
            &mut board,
            &[(1, Mark::B), (2, Mark::B), (4, Mark::B), (3, Mark::B)],
        );

        assert_eq!(placements[3].terminal, Some(Terminal::Win));
    }

    #[test]
    fn test_diagonal_win_detected_from_middle_cell() {
        // B on (5,6), (4,5), (3,4), (2,3); the last mark placed is (4,5),
        // which sits inside the run rather than at an end.
        let mut board = Board::new();
        play(
            &mut board,
            &[
                (6, Mark::B),
                (5, Mark::A),
                (4, Mark::A), (4, Mark::A), (4, Mark::B),
                (3, Mark::A), (3, Mark::A), (3, Mark::A), (3, Mark::B),
            ],
        );

        let placement = board.apply_move(5, Mark::B).unwrap();

        assert_eq!(placement.row, 4);
        assert_eq!(placement.terminal, Some(Terminal::Win));
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let mut board = Board::new();
        let placements = play(&mut board, &[(0, Mark::A), (1, Mark::A), (2, Mark::A)]);

        assert!(placements.iter().all(|p| p.terminal.is_none()));
    }

    // =====================================================================
    // Draw detection
    // =====================================================================

    /// A full-board pattern with no four-in-a-row: pairs of rows alternate
    /// their starting mark, so no axis ever runs longer than two.
    fn draw_mark(row: usize, col: usize) -> Mark {
        if (row / 2 + col) % 2 == 0 { Mark::A } else { Mark::B }
    }

    #[test]
    fn test_full_board_without_four_is_a_draw() {
        let mut board = Board::new();
        let mut placements = Vec::new();
        for col in 0..COLUMNS {
            for row in (0..ROWS).rev() {
                placements.push(board.apply_move(col, draw_mark(row, col)).unwrap());
            }
        }

        let (last, earlier) = placements.split_last().unwrap();
        assert!(earlier.iter().all(|p| p.terminal.is_none()));
        assert_eq!(last.terminal, Some(Terminal::Draw));
        assert!(board.is_full());
        assert_eq!(board.move_count(), ROWS * COLUMNS);
        assert_eq!(board.legal_columns().count(), 0);
    }

    #[test]
    fn test_is_full_false_with_one_open_column() {
        let mut board = Board::new();
        for col in 0..COLUMNS - 1 {
            for row in (0..ROWS).rev() {
                board.apply_move(col, draw_mark(row, col)).unwrap();
            }
        }

        assert!(!board.is_full());
        assert_eq!(board.legal_columns().collect::<Vec<_>>(), vec![COLUMNS - 1]);
    }

    // =====================================================================
    // score_candidate()
    // =====================================================================

    #[test]
    fn test_score_candidate_immediate_win() {
        let mut board = Board::new();
        play(&mut board, &[(0, Mark::A), (0, Mark::A), (0, Mark::A)]);

        assert_eq!(board.score_candidate(0, Mark::A), Ok(IMMEDIATE_WIN));
    }

    #[test]
    fn test_score_candidate_immediate_block() {
        let mut board = Board::new();
        play(&mut board, &[(0, Mark::A), (0, Mark::A), (0, Mark::A)]);

        assert_eq!(board.score_candidate(0, Mark::B), Ok(IMMEDIATE_BLOCK));
    }

    #[test]
    fn test_score_candidate_empty_board_prefers_center() {
        let board = Board::new();

        let scores: Vec<i32> = (0..COLUMNS)
            .map(|c| board.score_candidate(c, Mark::B).unwrap())
            .collect();

        assert_eq!(scores, vec![0, 1, 2, 3, 2, 1, 0]);
    }

    #[test]
    fn test_score_candidate_counts_adjacent_marks() {
        let mut board = Board::new();
        // B at (5,0) and (5,1); landing on (4,0) touches both.
        play(&mut board, &[(0, Mark::B), (1, Mark::B)]);

        // center bonus for column 0 is 0, plus two neighbours.
        assert_eq!(board.score_candidate(0, Mark::B), Ok(2));
        // The opposing mark sees no friendly neighbours there.
        assert_eq!(board.score_candidate(0, Mark::A), Ok(0));
    }

    #[test]
    fn test_score_candidate_does_not_mutate_board() {
        let mut board = Board::new();
        play(&mut board, &alternating(&[3, 3, 2]));
        let before = board.clone();

        for col in 0..COLUMNS {
            let _ = board.score_candidate(col, Mark::A);
            let _ = board.score_candidate(col, Mark::B);
        }

        assert_eq!(board, before);
    }

    #[test]
    fn test_score_candidate_rejects_unplayable_columns() {
        let board = Board::new();
        assert_eq!(
            board.score_candidate(COLUMNS + 2, Mark::A),
            Err(RuleError::ColumnOutOfRange { column: COLUMNS + 2 })
        );
    }

    // =====================================================================
    // Mark / Grid helpers
    // =====================================================================

    #[test]
    fn test_mark_other_flips() {
        assert_eq!(Mark::A.other(), Mark::B);
        assert_eq!(Mark::B.other(), Mark::A);
    }

    #[test]
    fn test_grid_display_renders_rows_top_down() {
        let mut board = Board::new();
        board.apply_move(0, Mark::A).unwrap();

        let rendered = board.grid().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), ROWS);
        assert_eq!(lines[ROWS - 1], "A......");
        assert_eq!(lines[0], ".......");
    }

    #[test]
    fn test_board_serializes_cells_as_nullable_marks() {
        let mut board = Board::new();
        board.apply_move(6, Mark::B).unwrap();

        let json = serde_json::to_value(&board).unwrap();

        assert_eq!(json["grid"]["cells"][5][6], "B");
        assert!(json["grid"]["cells"][0][0].is_null());
        assert_eq!(json["moves"][0]["seq"], 1);
    }
}
