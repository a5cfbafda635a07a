//! Board engine for the bingo server.
//!
//! Pure functions and plain data, no I/O:
//!
//! - [`generate_board`]: deal a fresh `size × size` card with a FREE centre
//! - [`completed_lines`]: every fully marked row, column, and diagonal
//! - [`is_winner`]: a card wins once it holds at least `size` lines
//!
//! The win rule is deliberately stricter than classic bingo: a 5×5 card
//! needs five completed lines and a 7×7 card needs seven. Rows, columns,
//! and both diagonals all count toward the same pool.

mod board;
mod cell;
mod error;
mod lines;

pub use board::{generate_board, generate_board_with, Board, BoardSize};
pub use cell::{Cell, CellValue, MAX_NUMBER, MIN_NUMBER};
pub use error::BoardError;
pub use lines::{completed_lines, is_winner, Diagonal, Line};
