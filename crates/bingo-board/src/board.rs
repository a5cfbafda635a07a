//! Bingo cards and how they are dealt.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{BoardError, Cell, CellValue, MAX_NUMBER, MIN_NUMBER};

// ---------------------------------------------------------------------------
// BoardSize
// ---------------------------------------------------------------------------

/// Side length of a card. Serialized as the bare integer `5` or `7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BoardSize {
    #[default]
    Five,
    Seven,
}

impl BoardSize {
    /// Number of cells along one side.
    pub fn side(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Seven => 7,
        }
    }

    /// Row and column of the FREE square.
    pub fn center(self) -> usize {
        self.side() / 2
    }
}

impl TryFrom<u8> for BoardSize {
    type Error = BoardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::Five),
            7 => Ok(Self::Seven),
            other => Err(BoardError::UnsupportedSize(other)),
        }
    }
}

impl From<BoardSize> for u8 {
    fn from(size: BoardSize) -> Self {
        match size {
            BoardSize::Five => 5,
            BoardSize::Seven => 7,
        }
    }
}

impl std::fmt::Display for BoardSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = self.side();
        write!(f, "{side}x{side}")
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A player's card: rows of cells, or no rows at all before one is dealt.
///
/// Serialized transparently as an array of rows, so an empty board is `[]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    rows: Vec<Vec<Cell>>,
}

impl Board {
    /// A board that has not been dealt yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a board from raw rows without validating them.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows. Zero for an empty board.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Flips the `marked` flag of one cell and returns the new value.
    /// Returns `None` when the coordinates fall outside the board.
    pub fn toggle(&mut self, row: usize, col: usize) -> Option<bool> {
        let cell = self.cell_mut(row, col)?;
        cell.marked = !cell.marked;
        Some(cell.marked)
    }

    /// Iterates over every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Checks that this board could have been dealt for `size`.
    ///
    /// An empty board is always acceptable. Otherwise the grid must be
    /// square with side `size`, hold distinct numbers in 1..=75, and carry
    /// exactly one FREE square, marked, at the centre.
    pub fn validate(&self, size: BoardSize) -> Result<(), BoardError> {
        if self.is_empty() {
            return Ok(());
        }

        let side = size.side();
        if self.rows.len() != side || self.rows.iter().any(|r| r.len() != side) {
            return Err(BoardError::WrongShape { expected: side });
        }

        let center = size.center();
        let mut seen = HashSet::with_capacity(side * side);
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let is_center = r == center && c == center;
                match cell.value {
                    CellValue::Free if is_center && cell.marked => {}
                    CellValue::Free => return Err(BoardError::MisplacedFree),
                    CellValue::Number(_) if is_center => {
                        return Err(BoardError::MisplacedFree);
                    }
                    CellValue::Number(n) => {
                        if !(MIN_NUMBER..=MAX_NUMBER).contains(&n) {
                            return Err(BoardError::ValueOutOfRange(n));
                        }
                        if !seen.insert(n) {
                            return Err(BoardError::DuplicateValue(n));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Deals a new card using the thread-local RNG.
pub fn generate_board(size: BoardSize) -> Board {
    generate_board_with(size, &mut rand::rng())
}

/// Deals a new card using the given RNG.
///
/// Shuffles the full 1..=75 pool (Fisher–Yates via `SliceRandom::shuffle`)
/// and lays the first `size² − 1` numbers out row-major, skipping the
/// centre, which becomes a marked FREE square. `size² − 1 ≤ 75` holds for
/// both supported sizes (24 and 48).
pub fn generate_board_with<R: Rng + ?Sized>(size: BoardSize, rng: &mut R) -> Board {
    let side = size.side();
    let center = size.center();

    let needed = side * side - 1;
    let mut pool: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER).collect();
    debug_assert!(needed <= pool.len());
    pool.shuffle(rng);
    let mut numbers = pool.into_iter().take(needed).map(Cell::number);

    let rows = (0..side)
        .map(|r| {
            (0..side)
                .map_while(|c| {
                    if r == center && c == center {
                        Some(Cell::free())
                    } else {
                        numbers.next()
                    }
                })
                .collect()
        })
        .collect();

    Board { rows }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn assert_dealt_correctly(size: BoardSize) {
        let board = generate_board_with(size, &mut seeded());
        let side = size.side();

        assert_eq!(board.size(), side);
        assert!(board.rows().iter().all(|r| r.len() == side));
        assert_eq!(board.cells().count(), side * side);

        let frees: Vec<_> = board.cells().filter(|c| c.value.is_free()).collect();
        assert_eq!(frees.len(), 1);
        let center = board.cell(side / 2, side / 2).unwrap();
        assert_eq!(*center, Cell::free());

        let numbers: HashSet<u8> =
            board.cells().filter_map(|c| c.value.number()).collect();
        assert_eq!(numbers.len(), side * side - 1, "numbers must be distinct");
        assert!(numbers.iter().all(|n| (1..=75).contains(n)));
        assert!(
            board.cells().filter(|c| !c.value.is_free()).all(|c| !c.marked),
            "numbered cells start unmarked"
        );
        assert!(board.validate(size).is_ok());
    }

    #[test]
    fn test_generate_five_by_five() {
        assert_dealt_correctly(BoardSize::Five);
    }

    #[test]
    fn test_generate_seven_by_seven() {
        assert_dealt_correctly(BoardSize::Seven);
    }

    #[test]
    fn test_every_deal_is_full_and_valid() {
        let mut rng = seeded();
        for size in [BoardSize::Five, BoardSize::Seven] {
            let side = size.side();
            for _ in 0..100 {
                let board = generate_board_with(size, &mut rng);
                assert!(board.rows().iter().all(|row| row.len() == side));
                assert_eq!(board.validate(size), Ok(()));
            }
        }
    }

    #[test]
    fn test_generate_with_thread_rng() {
        let board = generate_board(BoardSize::Seven);
        assert!(board.validate(BoardSize::Seven).is_ok());
    }

    #[test]
    fn test_generate_is_not_biased_toward_low_numbers() {
        // With 200 seeded deals every number in 1..=75 should appear at
        // least once; a "take the first 24" bug would never show 70+.
        let mut rng = seeded();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let board = generate_board_with(BoardSize::Five, &mut rng);
            seen.extend(board.cells().filter_map(|c| c.value.number()));
        }
        assert_eq!(seen.len(), 75);
    }

    #[test]
    fn test_board_size_from_u8() {
        assert_eq!(BoardSize::try_from(5), Ok(BoardSize::Five));
        assert_eq!(BoardSize::try_from(7), Ok(BoardSize::Seven));
        assert_eq!(BoardSize::try_from(6), Err(BoardError::UnsupportedSize(6)));
    }

    #[test]
    fn test_board_size_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&BoardSize::Seven).unwrap(), "7");
        assert!(serde_json::from_str::<BoardSize>("9").is_err());
    }

    #[test]
    fn test_empty_board_serializes_as_empty_array() {
        assert_eq!(serde_json::to_string(&Board::empty()).unwrap(), "[]");
    }

    #[test]
    fn test_toggle_flips_marked() {
        let mut board = generate_board_with(BoardSize::Five, &mut seeded());
        assert_eq!(board.toggle(0, 0), Some(true));
        assert_eq!(board.toggle(0, 0), Some(false));
        assert_eq!(board.toggle(5, 0), None);
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let board = generate_board_with(BoardSize::Five, &mut seeded());
        assert_eq!(
            board.validate(BoardSize::Seven),
            Err(BoardError::WrongShape { expected: 7 })
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut board = generate_board_with(BoardSize::Five, &mut seeded());
        let first = board.cell(0, 0).unwrap().value;
        board.cell_mut(0, 1).unwrap().value = first;
        let n = first.number().unwrap();
        assert_eq!(board.validate(BoardSize::Five), Err(BoardError::DuplicateValue(n)));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut board = generate_board_with(BoardSize::Five, &mut seeded());
        board.cell_mut(0, 0).unwrap().value = CellValue::Number(90);
        assert_eq!(board.validate(BoardSize::Five), Err(BoardError::ValueOutOfRange(90)));
    }

    #[test]
    fn test_validate_rejects_unmarked_or_moved_free() {
        let mut board = generate_board_with(BoardSize::Five, &mut seeded());
        board.cell_mut(2, 2).unwrap().marked = false;
        assert_eq!(board.validate(BoardSize::Five), Err(BoardError::MisplacedFree));

        let mut board = generate_board_with(BoardSize::Five, &mut seeded());
        board.cell_mut(0, 0).unwrap().value = CellValue::Free;
        assert_eq!(board.validate(BoardSize::Five), Err(BoardError::MisplacedFree));
    }

    #[test]
    fn test_validate_accepts_empty_board() {
        assert!(Board::empty().validate(BoardSize::Seven).is_ok());
    }
}
