//! Line detection and the win rule.

use serde::{Deserialize, Serialize};

use crate::Board;

/// Which diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagonal {
    /// Top-left to bottom-right.
    Primary,
    /// Top-right to bottom-left.
    Anti,
}

/// A fully marked row, column, or diagonal.
///
/// Serialized as `{"row": 0}`, `{"col": 3}`, or `{"diag": "anti"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    Row(usize),
    Col(usize),
    Diag(Diagonal),
}

/// Returns every completed line on the board: rows first, then columns,
/// then the primary and anti diagonals.
///
/// Both diagonals are always checked; every board here is square.
pub fn completed_lines(board: &Board) -> Vec<Line> {
    let size = board.size();
    if size == 0 {
        return Vec::new();
    }
    let marked = |r: usize, c: usize| board.cell(r, c).is_some_and(|cell| cell.marked);

    let rows = (0..size)
        .filter(|&r| (0..size).all(|c| marked(r, c)))
        .map(Line::Row);
    let cols = (0..size)
        .filter(|&c| (0..size).all(|r| marked(r, c)))
        .map(Line::Col);

    let mut lines: Vec<Line> = rows.chain(cols).collect();
    if (0..size).all(|i| marked(i, i)) {
        lines.push(Line::Diag(Diagonal::Primary));
    }
    if (0..size).all(|i| marked(i, size - 1 - i)) {
        lines.push(Line::Diag(Diagonal::Anti));
    }
    lines
}

/// `true` once the board holds at least as many completed lines as its
/// side length. An empty board never wins.
pub fn is_winner(board: &Board) -> bool {
    let size = board.size();
    size > 0 && completed_lines(board).len() >= size
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::{generate_board_with, BoardSize};

    fn fresh(size: BoardSize) -> Board {
        generate_board_with(size, &mut StdRng::seed_from_u64(11))
    }

    fn mark_row(board: &mut Board, r: usize) {
        for c in 0..board.size() {
            board.cell_mut(r, c).unwrap().marked = true;
        }
    }

    fn mark_col(board: &mut Board, c: usize) {
        for r in 0..board.size() {
            board.cell_mut(r, c).unwrap().marked = true;
        }
    }

    #[test]
    fn test_fresh_board_has_no_lines() {
        // Only the FREE square is marked.
        assert!(completed_lines(&fresh(BoardSize::Five)).is_empty());
    }

    #[test]
    fn test_single_row_is_the_only_line() {
        let mut board = fresh(BoardSize::Five);
        mark_row(&mut board, 0);
        assert_eq!(completed_lines(&board), vec![Line::Row(0)]);
    }

    #[test]
    fn test_columns_and_diagonals_detected() {
        let mut board = fresh(BoardSize::Five);
        mark_col(&mut board, 4);
        for i in 0..5 {
            board.cell_mut(i, i).unwrap().marked = true;
            board.cell_mut(i, 4 - i).unwrap().marked = true;
        }
        assert_eq!(
            completed_lines(&board),
            vec![
                Line::Col(4),
                Line::Diag(Diagonal::Primary),
                Line::Diag(Diagonal::Anti),
            ]
        );
    }

    #[test]
    fn test_five_by_five_needs_five_lines() {
        let mut board = fresh(BoardSize::Five);
        for r in 0..4 {
            mark_row(&mut board, r);
        }
        assert_eq!(completed_lines(&board).len(), 4);
        assert!(!is_winner(&board));

        // Column 1 avoids both diagonal corners on row 4.
        mark_col(&mut board, 1);
        assert_eq!(completed_lines(&board).len(), 5);
        assert!(is_winner(&board));
    }

    #[test]
    fn test_seven_by_seven_needs_seven_lines() {
        let mut board = fresh(BoardSize::Seven);
        for r in 0..6 {
            mark_row(&mut board, r);
        }
        assert_eq!(completed_lines(&board).len(), 6);
        assert!(!is_winner(&board));

        // Row 6 completes the last row and every column at once.
        mark_row(&mut board, 6);
        assert!(completed_lines(&board).len() >= 7);
        assert!(is_winner(&board));
    }

    #[test]
    fn test_seven_by_seven_exactly_seven_lines_wins() {
        let mut board = fresh(BoardSize::Seven);
        for c in 0..5 {
            mark_col(&mut board, c);
        }
        for i in 0..7 {
            board.cell_mut(i, i).unwrap().marked = true;
            board.cell_mut(i, 6 - i).unwrap().marked = true;
        }
        // 5 columns + 2 diagonals; no row is complete because column 5
        // holds only the two diagonal cells.
        assert_eq!(completed_lines(&board).len(), 7);
        assert!(is_winner(&board));
    }

    #[test]
    fn test_empty_board_never_wins() {
        assert!(completed_lines(&Board::empty()).is_empty());
        assert!(!is_winner(&Board::empty()));
    }

    #[test]
    fn test_line_json_shape() {
        assert_eq!(serde_json::to_string(&Line::Row(0)).unwrap(), r#"{"row":0}"#);
        assert_eq!(serde_json::to_string(&Line::Col(2)).unwrap(), r#"{"col":2}"#);
        assert_eq!(
            serde_json::to_string(&Line::Diag(Diagonal::Anti)).unwrap(),
            r#"{"diag":"anti"}"#
        );
    }
}
