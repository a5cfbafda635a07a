//! Error types for the board engine.

/// Errors raised while validating board sizes and client-supplied boards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Only 5×5 and 7×7 boards exist.
    #[error("unsupported board size {0} (expected 5 or 7)")]
    UnsupportedSize(u8),

    /// The grid is not `size × size`.
    #[error("board must be {expected}x{expected}")]
    WrongShape { expected: usize },

    /// A numbered cell lies outside 1..=75.
    #[error("cell value {0} is out of range")]
    ValueOutOfRange(u8),

    /// The same number appears twice on one card.
    #[error("number {0} appears more than once")]
    DuplicateValue(u8),

    /// FREE must sit at the centre, marked, and nowhere else.
    #[error("FREE cell must be the marked centre cell")]
    MisplacedFree,

    /// A value on the wire was neither an integer nor `"FREE"`.
    #[error("unrecognised cell value {0:?}")]
    UnknownCellValue(String),
}
