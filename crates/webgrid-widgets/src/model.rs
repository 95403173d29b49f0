//! Table model contract and an in-memory implementation.

use parking_lot::RwLock;
use std::sync::Arc;
use webgrid_core::{CellValue, ModelError};

/// Data source behind a table.
///
/// Implementations own their bounds policy: a table forwards every access
/// unchanged and never checks indices itself.
pub trait TableModel: Send + Sync {
    /// Number of rows currently held.
    fn row_count(&self) -> usize;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// Value at `(row, col)`, [`CellValue::Empty`] for an in-range cell
    /// without data.
    fn get_value(&self, row: usize, col: usize) -> Result<CellValue, ModelError>;

    fn set_value(&mut self, value: CellValue, row: usize, col: usize) -> Result<(), ModelError>;

    /// Remove all data.
    fn clear(&mut self);
}

/// Shared handle to a model; the table is one of possibly many holders.
pub type ModelHandle = Arc<RwLock<dyn TableModel>>;

/// Wrap a model in a [`ModelHandle`].
pub fn shared<M: TableModel + 'static>(model: M) -> ModelHandle {
    Arc::new(RwLock::new(model))
}

/// Row-major in-memory model with a fixed number of columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleTableModel {
    columns: usize,
    rows: Vec<Vec<CellValue>>,
}

impl SimpleTableModel {
    /// Create an empty model with `columns` columns.
    #[must_use]
    pub const fn new(columns: usize) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a model with `rows` empty rows.
    #[must_use]
    pub fn with_rows(columns: usize, rows: usize) -> Self {
        let mut model = Self::new(columns);
        model.resize_rows(rows);
        model
    }

    /// Append a row. Short rows are padded with empty cells, long rows
    /// truncated to the column count.
    pub fn push_row<I, V>(&mut self, cells: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut row: Vec<CellValue> = cells
            .into_iter()
            .take(self.columns)
            .map(Into::into)
            .collect();
        row.resize(self.columns, CellValue::Empty);
        self.rows.push(row);
    }

    /// Builder form of [`push_row`](Self::push_row).
    #[must_use]
    pub fn row<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.push_row(cells);
        self
    }

    /// Grow with empty rows or truncate to `rows`.
    pub fn resize_rows(&mut self, rows: usize) {
        self.rows.resize(rows, vec![CellValue::Empty; self.columns]);
    }

    /// Borrow a whole row.
    #[must_use]
    pub fn row_values(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    fn out_of_range(&self, row: usize, col: usize) -> ModelError {
        ModelError::OutOfRange {
            row,
            col,
            rows: self.rows.len(),
            cols: self.columns,
        }
    }
}

impl TableModel for SimpleTableModel {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns
    }

    fn get_value(&self, row: usize, col: usize) -> Result<CellValue, ModelError> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .cloned()
            .ok_or_else(|| self.out_of_range(row, col))
    }

    fn set_value(&mut self, value: CellValue, row: usize, col: usize) -> Result<(), ModelError> {
        let err = self.out_of_range(row, col);
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|cells| cells.get_mut(col))
            .ok_or(err)?;
        *cell = value;
        Ok(())
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Construction Tests =====

    #[test]
    fn test_simple_model_new_is_empty() {
        let model = SimpleTableModel::new(3);
        assert_eq!(model.column_count(), 3);
        assert_eq!(model.row_count(), 0);
    }

    #[test]
    fn test_simple_model_with_rows() {
        let model = SimpleTableModel::with_rows(2, 4);
        assert_eq!(model.row_count(), 4);
        assert_eq!(model.get_value(3, 1).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_push_row_pads_and_truncates() {
        let model = SimpleTableModel::new(2)
            .row(["a"])
            .row(["b", "c", "dropped"]);
        assert_eq!(
            model.row_values(0).unwrap(),
            &[CellValue::from("a"), CellValue::Empty]
        );
        assert_eq!(
            model.row_values(1).unwrap(),
            &[CellValue::from("b"), CellValue::from("c")]
        );
        assert!(model.row_values(2).is_none());
    }

    // ===== Access Tests =====

    #[test]
    fn test_set_then_get() {
        let mut model = SimpleTableModel::with_rows(2, 2);
        model.set_value(CellValue::Integer(5), 1, 0).unwrap();
        assert_eq!(model.get_value(1, 0).unwrap(), CellValue::Integer(5));
        assert_eq!(model.get_value(0, 0).unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_out_of_range() {
        let mut model = SimpleTableModel::with_rows(2, 1);
        assert_eq!(
            model.get_value(1, 0),
            Err(ModelError::OutOfRange {
                row: 1,
                col: 0,
                rows: 1,
                cols: 2
            })
        );
        assert!(matches!(
            model.set_value(CellValue::Bool(true), 0, 2),
            Err(ModelError::OutOfRange { col: 2, .. })
        ));
    }

    #[test]
    fn test_clear_and_resize() {
        let mut model = SimpleTableModel::new(1).row([1]).row([2]);
        model.clear();
        assert_eq!(model.row_count(), 0);
        model.resize_rows(3);
        assert_eq!(model.row_count(), 3);
        model.resize_rows(1);
        assert_eq!(model.row_count(), 1);
    }

    #[test]
    fn test_shared_handle_is_dyn() {
        let handle = shared(SimpleTableModel::with_rows(2, 1));
        handle.write().set_value("x".into(), 0, 1).unwrap();
        assert_eq!(handle.read().get_value(0, 1).unwrap(), CellValue::from("x"));
        assert_eq!(Arc::strong_count(&handle), 1);
    }
}
