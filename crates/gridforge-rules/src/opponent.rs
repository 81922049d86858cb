//! The synthetic opponent's decision procedure.
//!
//! Stateless and deterministic: the same board and mark always produce the
//! same column. There is no randomness anywhere in here.

use crate::{Board, Mark, IMMEDIATE_WIN};

/// Picks the column the synthetic opponent plays as `mark`.
///
/// Priority order, each pass scanning legal columns in ascending index:
///
/// 1. a column that wins immediately for `mark`
/// 2. a column where the other mark would win immediately (block it)
/// 3. the highest [`Board::score_candidate`] for `mark`, ties going to
///    the lowest column index
///
/// Returns `None` only when the board has no legal column left.
pub fn choose_column(board: &Board, mark: Mark) -> Option<usize> {
    let legal: Vec<usize> = board.legal_columns().collect();

    let wins_for = |col: usize, who: Mark| {
        board.score_candidate(col, who) == Ok(IMMEDIATE_WIN)
    };

    if let Some(&col) = legal.iter().find(|&&col| wins_for(col, mark)) {
        return Some(col);
    }

    if let Some(&col) = legal.iter().find(|&&col| wins_for(col, mark.other()))
    {
        return Some(col);
    }

    // `max_by_key` keeps the LAST maximum, so compare on (score, -col) to
    // make the lowest index win ties.
    legal
        .iter()
        .filter_map(|&col| board.score_candidate(col, mark).ok().map(|s| (s, col)))
        .max_by_key(|&(score, col)| (score, std::cmp::Reverse(col)))
        .map(|(_, col)| col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{COLUMNS, ROWS};

    fn board_from(moves: &[(usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(col, mark) in moves {
            board.apply_move(col, mark).expect("legal setup move");
        }
        board
    }

    #[test]
    fn test_choose_column_empty_board_takes_center() {
        assert_eq!(choose_column(&Board::new(), Mark::B), Some(3));
    }

    #[test]
    fn test_choose_column_prefers_win_over_block() {
        // A threatens column 0 (three stacked), B threatens column 6.
        // The block is at the lower index, but winning comes first.
        let board = board_from(&[
            (0, Mark::A), (6, Mark::B),
            (0, Mark::A), (6, Mark::B),
            (0, Mark::A), (6, Mark::B),
        ]);

        assert_eq!(choose_column(&board, Mark::B), Some(6));
    }

    #[test]
    fn test_choose_column_blocks_when_no_win_available() {
        let board = board_from(&[
            (1, Mark::A), (5, Mark::B),
            (2, Mark::A), (5, Mark::B),
            (3, Mark::A),
        ]);

        // A's row 5 has columns 1..=3; both 0 and 4 complete it. Column 0
        // comes first in ascending order.
        assert_eq!(choose_column(&board, Mark::B), Some(0));
    }

    #[test]
    fn test_choose_column_tie_breaks_to_lowest_index() {
        // A single A mark at the center bottom: column 3 still scores the
        // full center bonus for B and beats its neighbours.
        let board = board_from(&[(3, Mark::A)]);
        assert_eq!(choose_column(&board, Mark::B), Some(3));

        let board = board_from(&[(3, Mark::A), (3, Mark::B), (3, Mark::A),
            (3, Mark::B), (3, Mark::A), (3, Mark::B)]);
        // Column 3 is full; 2 and 4 tie on center bonus 2 plus one B
        // neighbour each at (4,3).
        assert_eq!(
            board.score_candidate(2, Mark::B),
            board.score_candidate(4, Mark::B)
        );
        assert_eq!(choose_column(&board, Mark::B), Some(2));
    }

    #[test]
    fn test_choose_column_is_deterministic() {
        let board = board_from(&[
            (3, Mark::A), (2, Mark::B), (4, Mark::A), (4, Mark::B),
            (1, Mark::A), (3, Mark::B),
        ]);

        let first = choose_column(&board, Mark::B);
        for _ in 0..50 {
            assert_eq!(choose_column(&board, Mark::B), first);
        }
        assert_eq!(choose_column(&board.clone(), Mark::B), first);
    }

    #[test]
    fn test_choose_column_full_board_returns_none() {
        let mut board = Board::new();
        for col in 0..COLUMNS {
            for row in (0..ROWS).rev() {
                let mark = if (row / 2 + col) % 2 == 0 { Mark::A } else { Mark::B };
                board.apply_move(col, mark).unwrap();
            }
        }

        assert_eq!(choose_column(&board, Mark::B), None);
    }

    #[test]
    fn test_choose_column_skips_full_columns() {
        let board = board_from(&[
            (3, Mark::A), (3, Mark::B), (3, Mark::A),
            (3, Mark::B), (3, Mark::A), (3, Mark::B),
        ]);

        let col = choose_column(&board, Mark::A).unwrap();
        assert_ne!(col, 3);
    }
}
