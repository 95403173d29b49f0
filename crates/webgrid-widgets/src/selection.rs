//! Selection model and server-side selection state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How client selection gestures are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionModel {
    /// One cell at a time
    #[default]
    Cell,
    /// One row at a time
    SingleRow,
    /// Any set of rows
    MultiRow,
}

impl SelectionModel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::SingleRow => "singlerow",
            Self::MultiRow => "multirow",
        }
    }

    /// Whether gestures select whole rows.
    #[must_use]
    pub const fn selects_rows(self) -> bool {
        matches!(self, Self::SingleRow | Self::MultiRow)
    }
}

impl fmt::Display for SelectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown selection model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSelectionModelError(String);

impl fmt::Display for ParseSelectionModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown selection model: {}", self.0)
    }
}

impl std::error::Error for ParseSelectionModelError {}

impl FromStr for SelectionModel {
    type Err = ParseSelectionModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cell" => Ok(Self::Cell),
            "singlerow" => Ok(Self::SingleRow),
            "multirow" => Ok(Self::MultiRow),
            other => Err(ParseSelectionModelError(other.to_string())),
        }
    }
}

/// A client selection gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    CellClick { row: usize, col: usize },
    RowClick { row: usize },
}

/// What is currently selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    cell: Option<(usize, usize)>,
    rows: BTreeSet<usize>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected cell, if the last cell-mode gesture picked one.
    #[must_use]
    pub const fn cell(&self) -> Option<(usize, usize)> {
        self.cell
    }

    /// Selected rows in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }

    #[must_use]
    pub fn is_row_selected(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.is_none() && self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.cell = None;
        self.rows.clear();
    }

    /// Apply a gesture under `mode`. Returns true if the selection changed.
    ///
    /// A row click in cell mode leaves the selection alone.
    pub fn apply(&mut self, mode: SelectionModel, gesture: Gesture) -> bool {
        let before = self.clone();
        match (mode, gesture) {
            (SelectionModel::Cell, Gesture::CellClick { row, col }) => {
                self.rows.clear();
                self.cell = Some((row, col));
            }
            (SelectionModel::Cell, Gesture::RowClick { .. }) => {}
            (
                SelectionModel::SingleRow,
                Gesture::CellClick { row, .. } | Gesture::RowClick { row },
            ) => {
                self.cell = None;
                self.rows.clear();
                self.rows.insert(row);
            }
            (
                SelectionModel::MultiRow,
                Gesture::CellClick { row, .. } | Gesture::RowClick { row },
            ) => {
                self.cell = None;
                if !self.rows.remove(&row) {
                    self.rows.insert(row);
                }
            }
        }
        *self != before
    }
}
