//! Error types for the rules layer.

/// A move that the board refuses.
///
/// These are *validation* errors: the board is never touched when one is
/// returned, and only the player who submitted the move hears about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The column index is outside `0..COLUMNS`.
    #[error("column {column} is out of range")]
    ColumnOutOfRange { column: usize },

    /// The column's top cell is already occupied.
    #[error("column {column} is full")]
    ColumnFull { column: usize },
}
