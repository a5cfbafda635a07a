//! A single square on a bingo card.

use serde::{Deserialize, Serialize};

use crate::BoardError;

/// Lowest number that can be called.
pub const MIN_NUMBER: u8 = 1;

/// Highest number that can be called.
pub const MAX_NUMBER: u8 = 75;

/// What is printed on a cell: the FREE marker or a number in 1..=75.
///
/// On the wire this is either the string `"FREE"` or a bare integer,
/// matching what browser clients already render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCellValue", into = "RawCellValue")]
pub enum CellValue {
    Free,
    Number(u8),
}

impl CellValue {
    /// Returns the number on this cell, or `None` for FREE.
    pub fn number(self) -> Option<u8> {
        match self {
            Self::Free => None,
            Self::Number(n) => Some(n),
        }
    }

    pub fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "FREE"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Untagged mirror of [`CellValue`] used only for (de)serialization.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCellValue {
    Number(u8),
    Text(String),
}

impl TryFrom<RawCellValue> for CellValue {
    type Error = BoardError;

    fn try_from(raw: RawCellValue) -> Result<Self, Self::Error> {
        match raw {
            RawCellValue::Number(n) => Ok(Self::Number(n)),
            RawCellValue::Text(text) if text == "FREE" => Ok(Self::Free),
            RawCellValue::Text(text) => Err(BoardError::UnknownCellValue(text)),
        }
    }
}

impl From<CellValue> for RawCellValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Free => Self::Text("FREE".to_string()),
            CellValue::Number(n) => Self::Number(n),
        }
    }
}

/// One square of a card. The FREE square starts (and stays) marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    pub marked: bool,
}

impl Cell {
    /// The centre square.
    pub fn free() -> Self {
        Self {
            value: CellValue::Free,
            marked: true,
        }
    }

    /// An unmarked numbered square.
    pub fn number(n: u8) -> Self {
        Self {
            value: CellValue::Number(n),
            marked: false,
        }
    }
}
