//! The table widget.
//!
//! A [`Table`] binds column descriptors to a shared [`TableModel`](crate::TableModel)
//! and turns decoded client interactions into events on its channels:
//!
//! | channel              | payload            | fired by                              |
//! |----------------------|--------------------|---------------------------------------|
//! | `row_clicked`        | `usize`            | row click (form or request)           |
//! | `cell_clicked`       | [`CellClick`]      | cell click (form or request)          |
//! | `cell_value_changed` | [`CellValueChange`]| every successful [`Table::set_value`] |
//! | `before_load`        | [`LoadData`]       | load request, renderer writes here    |
//! | `after_load`         | `Table`            | after every before-load fire          |
//!
//! Every method takes `&self`; a table is usually shared behind an `Arc`
//! between request handling and application code.

use crate::column::TableColumn;
use crate::form::{FormAccumulator, FormEvent};
use crate::load::{LoadChannel, LoadData};
use crate::model::ModelHandle;
use crate::selection::{Gesture, Selection, SelectionModel};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use webgrid_core::{
    protocol, CellValue, Channel, ConfigurationError, RequestArgs, ResponseSink, Result,
    ValueKind, WidgetId, WidgetKind,
};

/// A click on a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellClick {
    pub row: usize,
    pub col: usize,
}

/// A cell value replaced through [`Table::set_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellValueChange {
    pub row: usize,
    pub col: usize,
    pub old_value: CellValue,
    pub new_value: CellValue,
}

/// Server-side table widget.
pub struct Table {
    id: WidgetId,
    name: String,
    kind: WidgetKind,
    columns: RwLock<Arc<[TableColumn]>>,
    model: Option<ModelHandle>,
    selection_model: Mutex<SelectionModel>,
    selection: Mutex<Selection>,
    form: Mutex<FormAccumulator>,
    // Held from the old-value read through the change event.
    write_gate: ReentrantMutex<()>,
    row_clicked: Channel<usize>,
    cell_clicked: Channel<CellClick>,
    cell_value_changed: Channel<CellValueChange>,
    before_load: LoadChannel,
    after_load: Channel<Table>,
}

impl Table {
    /// Create an anonymous table.
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = TableColumn>, model: ModelHandle) -> Self {
        Self::builder().columns(columns).model(model).build()
    }

    /// Create a named table.
    #[must_use]
    pub fn named(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = TableColumn>,
        model: ModelHandle,
    ) -> Self {
        Self::builder()
            .name(name)
            .columns(columns)
            .model(model)
            .build()
    }

    #[must_use]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    #[must_use]
    pub const fn id(&self) -> WidgetId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    // ===== Configuration =====

    /// Check that the table can be rendered.
    ///
    /// Mutators never call this; renderers must before attaching.
    pub fn check_valid_config(&self) -> Result<(), ConfigurationError> {
        let columns = self.columns.read().len();
        if columns == 0 {
            return Err(ConfigurationError::NoColumns);
        }
        let model_columns = self.model_handle()?.read().column_count();
        if columns != model_columns {
            return Err(ConfigurationError::ColumnMismatch {
                columns,
                model_columns,
            });
        }
        Ok(())
    }

    /// Snapshot of the column descriptors.
    #[must_use]
    pub fn columns(&self) -> Arc<[TableColumn]> {
        Arc::clone(&*self.columns.read())
    }

    /// Replace all column descriptors.
    pub fn set_columns(&self, columns: impl IntoIterator<Item = TableColumn>) {
        let columns: Arc<[TableColumn]> = columns.into_iter().collect();
        tracing::debug!(table = %self.name, columns = columns.len(), "columns replaced");
        *self.columns.write() = columns;
    }

    #[must_use]
    pub const fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    fn model_handle(&self) -> Result<&ModelHandle, ConfigurationError> {
        self.model.as_ref().ok_or(ConfigurationError::NoModel)
    }

    // ===== Data Access =====

    pub fn column_count(&self) -> Result<usize> {
        Ok(self.model_handle()?.read().column_count())
    }

    pub fn row_count(&self) -> Result<usize> {
        Ok(self.model_handle()?.read().row_count())
    }

    /// Read a cell. Bounds are the model's business.
    pub fn get_value(&self, row: usize, col: usize) -> Result<CellValue> {
        Ok(self.model_handle()?.read().get_value(row, col)?)
    }

    /// Write a cell and fire `cell_value_changed` once.
    ///
    /// Writes are serialized per table: the old value is read, the new one
    /// written and the event delivered before another writer may start, so
    /// events arrive in write order. The model lock is released before the
    /// event fires; subscribers may read the table, and may call `set_value`
    /// again from the same thread.
    pub fn set_value(&self, value: impl Into<CellValue>, row: usize, col: usize) -> Result<()> {
        let model = self.model_handle()?;
        let new_value = value.into();
        let _gate = self.write_gate.lock();
        let old_value = {
            let mut model = model.write();
            let old = model.get_value(row, col)?;
            model.set_value(new_value.clone(), row, col)?;
            old
        };
        tracing::trace!(table = %self.name, row, col, "cell value set");
        self.cell_value_changed.fire(&CellValueChange {
            row,
            col,
            old_value,
            new_value,
        })?;
        Ok(())
    }

    /// Remove all model data. Fires nothing.
    pub fn clear(&self) -> Result<()> {
        self.model_handle()?.write().clear();
        self.selection.lock().clear();
        tracing::debug!(table = %self.name, "table cleared");
        Ok(())
    }

    // ===== Selection =====

    #[must_use]
    pub fn selection_model(&self) -> SelectionModel {
        *self.selection_model.lock()
    }

    /// Takes effect on the next client interaction.
    pub fn set_selection_model(&self, mode: SelectionModel) {
        *self.selection_model.lock() = mode;
    }

    /// Snapshot of the current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection.lock().clone()
    }

    pub fn clear_selection(&self) {
        self.selection.lock().clear();
    }

    fn select(&self, gesture: Gesture) {
        let mode = self.selection_model();
        if self.selection.lock().apply(mode, gesture) {
            tracing::trace!(table = %self.name, %mode, ?gesture, "selection changed");
        }
    }

    // ===== Channels =====

    #[must_use]
    pub const fn row_clicked(&self) -> &Channel<usize> {
        &self.row_clicked
    }

    #[must_use]
    pub const fn cell_clicked(&self) -> &Channel<CellClick> {
        &self.cell_clicked
    }

    #[must_use]
    pub const fn cell_value_changed(&self) -> &Channel<CellValueChange> {
        &self.cell_value_changed
    }

    #[must_use]
    pub const fn before_load(&self) -> &LoadChannel {
        &self.before_load
    }

    #[must_use]
    pub const fn after_load(&self) -> &Channel<Self> {
        &self.after_load
    }

    // ===== Client Interaction =====

    /// Decode one complete form submission.
    ///
    /// Fields are batched into logical events by a buffer owned by this
    /// call, so overlapping submissions never mix. Whatever is still
    /// buffered after the last field is completed as well. Stops at the
    /// first failing event.
    pub fn handle_form_request<'f>(
        &self,
        fields: impl IntoIterator<Item = (&'f str, &'f str)>,
    ) -> Result<()> {
        let names = &protocol().fields;
        let mut form = FormAccumulator::new();
        for (field, value) in fields {
            if let Some(event) = form.accept(names, field, value) {
                self.dispatch_form_event(event)?;
            }
        }
        form.flush().map_or(Ok(()), |event| self.dispatch_form_event(event))
    }

    /// Feed one field of a form submission into the table's shared buffer.
    ///
    /// The buffer is shared by every caller, so this is only correct while
    /// one submission at a time is being decoded. Prefer
    /// [`Table::handle_form_request`] when requests may overlap. See
    /// [`FormAccumulator`] for the batching rules.
    pub fn handle_form(&self, field: &str, value: &str) -> Result<()> {
        let event = self.form.lock().accept(&protocol().fields, field, value);
        event.map_or(Ok(()), |event| self.dispatch_form_event(event))
    }

    /// Complete any event in the shared buffer. Call at the end of a form
    /// request fed through [`Table::handle_form`].
    pub fn flush_form(&self) -> Result<()> {
        let event = self.form.lock().flush();
        event.map_or(Ok(()), |event| self.dispatch_form_event(event))
    }

    /// Dispatch a decoded form event.
    pub fn dispatch_form_event(&self, event: FormEvent) -> Result<()> {
        match event {
            FormEvent::RowClicked { row } => self.click_row(row),
            FormEvent::CellClicked { row, col } => self.click_cell(row, col),
            FormEvent::ValueSubmitted { row, col, raw } => self.submit_value(row, col, &raw),
        }
    }

    /// Handle an asynchronous request addressed to this table.
    ///
    /// The event id selects the action; a request without one is a load.
    /// Unknown ids and incomplete arguments are ignored.
    pub fn handle_ajax_request(
        &self,
        args: &RequestArgs,
        response: &mut dyn ResponseSink,
    ) -> Result<()> {
        let proto = protocol();
        let events = &proto.events;
        let fields = &proto.fields;
        let event = args.get(&events.key).unwrap_or(events.load_data.as_str());
        tracing::debug!(table = %self.name, event, "request");

        if event == events.load_data {
            let first_row = args.parse_index(&proto.args.first_row);
            let row_count = args.parse_index(&proto.args.row_count);
            return self.load(response, first_row, row_count);
        }
        if event == events.after_load {
            self.after_load.fire(self)?;
            return Ok(());
        }

        let row = args.parse_index(&fields.row);
        let col = args.parse_index(&fields.col);
        match (row, col) {
            (Some(row), Some(col)) if event == events.cell_clicked => self.click_cell(row, col),
            (Some(row), _) if event == events.row_clicked => self.click_row(row),
            (Some(row), Some(col)) if event == events.cell_value_changed => {
                match args.get(&fields.val) {
                    Some(raw) => self.submit_value(row, col, raw),
                    None => {
                        tracing::debug!(table = %self.name, row, col, "edit request without value");
                        Ok(())
                    }
                }
            }
            _ => {
                tracing::debug!(table = %self.name, event, ?row, ?col, "ignoring request");
                Ok(())
            }
        }
    }

    fn load(
        &self,
        response: &mut dyn ResponseSink,
        first_row: Option<usize>,
        row_count: Option<usize>,
    ) -> Result<()> {
        let mut data = LoadData {
            response,
            table: self,
            first_row,
            row_count,
        };
        self.before_load.fire(&mut data)?;
        self.after_load.fire(self)?;
        Ok(())
    }

    fn click_row(&self, row: usize) -> Result<()> {
        self.select(Gesture::RowClick { row });
        self.row_clicked.fire(&row)?;
        Ok(())
    }

    fn click_cell(&self, row: usize, col: usize) -> Result<()> {
        self.select(Gesture::CellClick { row, col });
        self.cell_clicked.fire(&CellClick { row, col })?;
        Ok(())
    }

    fn submit_value(&self, row: usize, col: usize, raw: &str) -> Result<()> {
        let kind = self
            .columns
            .read()
            .get(col)
            .map_or(ValueKind::Text, |column| column.kind);
        match CellValue::parse(kind, raw) {
            Ok(value) => self.set_value(value, row, col),
            Err(err) => {
                tracing::warn!(table = %self.name, row, col, %err, "dropping unparseable value");
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("columns", &self.columns.read().len())
            .field("has_model", &self.model.is_some())
            .field("selection_model", &self.selection_model())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Table`].
#[derive(Default)]
pub struct TableBuilder {
    name: Option<String>,
    kind: WidgetKind,
    columns: Vec<TableColumn>,
    model: Option<ModelHandle>,
    selection_model: SelectionModel,
}

impl TableBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Kind discriminator, `table` unless set.
    #[must_use]
    pub fn kind(mut self, kind: WidgetKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: impl IntoIterator<Item = TableColumn>) -> Self {
        self.columns.extend(columns);
        self
    }

    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn model(mut self, model: ModelHandle) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub const fn selection_model(mut self, mode: SelectionModel) -> Self {
        self.selection_model = mode;
        self
    }

    /// Build the table. Anonymous tables are named `<kind><id>`.
    #[must_use]
    pub fn build(self) -> Table {
        let id = WidgetId::next();
        let name = self.name.unwrap_or_else(|| format!("{}{id}", self.kind));
        tracing::debug!(%id, name = %name, kind = %self.kind, "table created");
        Table {
            id,
            name,
            kind: self.kind,
            columns: RwLock::new(self.columns.into()),
            model: self.model,
            selection_model: Mutex::new(self.selection_model),
            selection: Mutex::new(Selection::new()),
            form: Mutex::new(FormAccumulator::new()),
            write_gate: ReentrantMutex::new(()),
            row_clicked: Channel::new("rowClicked"),
            cell_clicked: Channel::new("cellClicked"),
            cell_value_changed: Channel::new("cellValueChanged"),
            before_load: LoadChannel::new(),
            after_load: Channel::new("afterLoad"),
        }
    }
}

impl fmt::Debug for TableBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("columns", &self.columns.len())
            .field("has_model", &self.model.is_some())
            .field("selection_model", &self.selection_model)
            .finish()
    }
}
