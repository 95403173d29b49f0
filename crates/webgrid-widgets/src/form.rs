//! Assembly of logical events from individual form fields.
//!
//! A form submission reaches the table one `(field, value)` pair at a time.
//! The accumulator buffers the pairs of one logical event and decides when
//! it is complete:
//!
//! - a `cnt` field announces how many of `row`, `col` and `val` belong to the
//!   event; once that many are buffered the event completes,
//! - a field that is already buffered closes the pending event and starts the
//!   next one,
//! - [`FormAccumulator::flush`] completes whatever is buffered.
//!
//! The buffered shape decides the event: `row` alone is a row click, `row` and
//! `col` a cell click, all three a value edit. Other shapes are dropped.

use webgrid_core::protocol::{parse_index, FieldNames};

/// A complete logical event decoded from form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    RowClicked { row: usize },
    CellClicked { row: usize, col: usize },
    /// Raw value text, decoded later with the column's kind.
    ValueSubmitted { row: usize, col: usize, raw: String },
}

/// Buffer for the fields of one logical event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormAccumulator {
    row: Option<usize>,
    col: Option<usize>,
    val: Option<String>,
    expected: Option<usize>,
}

impl FormAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vocabulary fields buffered so far.
    #[must_use]
    pub fn buffered(&self) -> usize {
        usize::from(self.row.is_some())
            + usize::from(self.col.is_some())
            + usize::from(self.val.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffered() == 0 && self.expected.is_none()
    }

    /// Feed one field. Returns an event when one completes.
    ///
    /// Unknown fields and malformed indices are ignored.
    pub fn accept(&mut self, names: &FieldNames, field: &str, value: &str) -> Option<FormEvent> {
        if field == names.cnt {
            match parse_index(value) {
                Some(n @ 1..=3) => self.expected = Some(n),
                _ => {
                    tracing::debug!(field, value, "ignoring malformed field count");
                    return None;
                }
            }
            return self.complete_if_ready();
        }

        let mut closed = None;
        if field == names.row {
            let Some(row) = parse_index(value) else {
                tracing::debug!(field, value, "ignoring malformed row index");
                return None;
            };
            if self.row.is_some() {
                closed = self.flush();
            }
            self.row = Some(row);
        } else if field == names.col {
            let Some(col) = parse_index(value) else {
                tracing::debug!(field, value, "ignoring malformed column index");
                return None;
            };
            if self.col.is_some() {
                closed = self.flush();
            }
            self.col = Some(col);
        } else if field == names.val {
            if self.val.is_some() {
                closed = self.flush();
            }
            self.val = Some(value.to_string());
        } else {
            tracing::trace!(field, "ignoring unknown form field");
            return None;
        }

        closed.or_else(|| self.complete_if_ready())
    }

    /// Complete the buffered event regardless of any announced count.
    pub fn flush(&mut self) -> Option<FormEvent> {
        let Self { row, col, val, .. } = std::mem::take(self);
        match (row, col, val) {
            (Some(row), None, None) => Some(FormEvent::RowClicked { row }),
            (Some(row), Some(col), None) => Some(FormEvent::CellClicked { row, col }),
            (Some(row), Some(col), Some(raw)) => Some(FormEvent::ValueSubmitted { row, col, raw }),
            (None, None, None) => None,
            (row, col, val) => {
                tracing::debug!(
                    ?row,
                    ?col,
                    has_value = val.is_some(),
                    "dropping incomplete form event"
                );
                None
            }
        }
    }

    fn complete_if_ready(&mut self) -> Option<FormEvent> {
        match self.expected {
            Some(n) if self.buffered() >= n => self.flush(),
            _ => None,
        }
    }
}
