//! Board rules for Gridforge.
//!
//! This crate is the pure, synchronous heart of the game. It knows nothing
//! about players, sockets, or timers, only about a fixed grid of cells and
//! the rules that govern it:
//!
//! - **Board** ([`Board`], [`Grid`]): move legality, gravity, the move log
//! - **Win/draw detection**: four-in-a-row through the cell just placed,
//!   and "every column is full"
//! - **Scoring** ([`Board::score_candidate`]): a non-mutating evaluation
//!   of "what if `mark` dropped into this column?"
//! - **Synthetic opponent** ([`choose_column`]): a deterministic decision
//!   procedure built on the scoring primitive
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← owns one Board per session, enforces turns
//!     ↕
//! Rules Layer (this crate)  ← legality, terminal detection, scoring
//! ```

mod board;
mod error;
mod opponent;

pub use board::{
    Board, Cell, Grid, Mark, Move, Placement, Terminal, COLUMNS, CONNECT,
    IMMEDIATE_BLOCK, IMMEDIATE_WIN, ROWS,
};
pub use error::RuleError;
pub use opponent::choose_column;
