//! Column descriptors.

use serde::{Deserialize, Serialize};
use webgrid_core::{CellValue, ValueKind, ValueParseError};

/// Text alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Column definition for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column key (field name on the wire)
    pub key: String,
    /// Display header
    pub header: String,
    /// Column width in pixels (None = auto)
    pub width: Option<u32>,
    /// Text alignment
    pub align: TextAlign,
    /// Whether the client may sort by this column
    pub sortable: bool,
    /// Whether the client offers an editor for this column
    pub editable: bool,
    /// Kind used to decode edited values
    pub kind: ValueKind,
}

impl TableColumn {
    /// Create a new text column.
    #[must_use]
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width: None,
            align: TextAlign::Left,
            sortable: false,
            editable: false,
            kind: ValueKind::Text,
        }
    }

    /// Set column width.
    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width.max(20));
        self
    }

    /// Set text alignment.
    #[must_use]
    pub const fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Make column sortable.
    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Make column editable.
    #[must_use]
    pub const fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Set the value kind. Numeric kinds align right unless set otherwise.
    #[must_use]
    pub const fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        if matches!(kind, ValueKind::Number | ValueKind::Integer)
            && matches!(self.align, TextAlign::Left)
        {
            self.align = TextAlign::Right;
        }
        self
    }

    /// Decode client text for a cell of this column.
    pub fn parse(&self, raw: &str) -> Result<CellValue, ValueParseError> {
        CellValue::parse(self.kind, raw)
    }
}
