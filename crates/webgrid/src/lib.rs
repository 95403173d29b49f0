//! webgrid: a server-side table widget.
//!
//! A [`Table`](widgets::Table) binds column descriptors to a shared model,
//! tracks selection, and turns client form fields and asynchronous requests
//! into typed events. Rendering happens through subscribers of the
//! before-load channel; [`JsonRenderer`](widgets::JsonRenderer) is provided.
//!
//! # Example
//!
//! ```
//! use webgrid::prelude::*;
//!
//! let table = Table::named(
//!     "orders",
//!     [
//!         TableColumn::new("id", "Order"),
//!         TableColumn::new("qty", "Quantity").kind(ValueKind::Integer).editable(),
//!     ],
//!     shared(SimpleTableModel::new(2).row([CellValue::from("A-17"), CellValue::Integer(1)])),
//! );
//! JsonRenderer::attach(&table).unwrap();
//!
//! table.handle_ajax_request(
//!     &RequestArgs::from_query("ev=edit&row=0&col=1&val=3"),
//!     &mut BufferedResponse::new(),
//! ).unwrap();
//!
//! let mut response = BufferedResponse::new();
//! table.handle_ajax_request(&RequestArgs::from_query("start=0&limit=10"), &mut response).unwrap();
//! assert_eq!(response.content_type(), Some("application/json"));
//! assert!(response.body_text().contains(r#""qty":3"#));
//! ```

pub use webgrid_core::*;
pub use webgrid_widgets as widgets;

/// Commonly used types.
pub mod prelude {
    pub use webgrid_core::{
        BufferedResponse, CellValue, Channel, RequestArgs, ResponseSink, SubscriptionId,
        TableError, ValueKind,
    };
    pub use webgrid_widgets::{
        shared, CellClick, CellValueChange, JsonRenderer, LoadData, SelectionModel,
        SimpleTableModel, Table, TableColumn, TableModel,
    };
}
