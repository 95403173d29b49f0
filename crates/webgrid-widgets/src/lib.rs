//! Server-side table widget for webgrid.
//!
//! [`Table`] binds [`TableColumn`]s to a shared [`TableModel`], decodes client
//! interactions (form fields and asynchronous requests) and reports them on
//! typed channels. [`JsonRenderer`] answers load requests.

pub mod column;
pub mod form;
pub mod load;
pub mod model;
pub mod renderer;
pub mod selection;
pub mod table;

pub use column::{TableColumn, TextAlign};
pub use form::{FormAccumulator, FormEvent};
pub use load::{LoadChannel, LoadData};
pub use model::{shared, ModelHandle, SimpleTableModel, TableModel};
pub use renderer::JsonRenderer;
pub use selection::{Gesture, ParseSelectionModelError, Selection, SelectionModel};
pub use table::{CellClick, CellValueChange, Table, TableBuilder};
