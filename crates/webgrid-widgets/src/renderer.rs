//! JSON data renderer.
//!
//! Writes the rows requested by a load as
//! `{"total": n, "first": i, "rows": [{"<key>": value, ...}, ...]}`.

use crate::load::LoadData;
use crate::table::Table;
use serde_json::{json, Map, Value};
use webgrid_core::{BoxError, ConfigurationError, HandlerResult, SubscriptionId};

/// Content type of rendered responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Renders load requests as JSON row objects keyed by column key.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    /// Subscribe the renderer to `table`'s before-load channel.
    ///
    /// Refuses tables that fail [`Table::check_valid_config`].
    pub fn attach(table: &Table) -> Result<SubscriptionId, ConfigurationError> {
        table.check_valid_config()?;
        let id = table.before_load().subscribe(Self::render);
        tracing::debug!(table = table.name(), subscription = %id, "json renderer attached");
        Ok(id)
    }

    /// Write the requested page into the load's response.
    pub fn render(data: &mut LoadData<'_>) -> HandlerResult {
        let body = Self::page(data)?;
        data.response.set_content_type(CONTENT_TYPE);
        serde_json::to_writer(&mut *data.response, &body)?;
        Ok(())
    }

    fn page(data: &LoadData<'_>) -> Result<Value, BoxError> {
        let columns = data.table.columns();
        let model = data.table.model().ok_or(ConfigurationError::NoModel)?.read();
        let total = model.row_count();
        let range = data.row_range(total);
        let first = range.start;

        let mut rows = Vec::with_capacity(range.len());
        for row in range {
            let mut object = Map::with_capacity(columns.len());
            for (col, column) in columns.iter().enumerate() {
                object.insert(column.key.clone(), model.get_value(row, col)?.to_json());
            }
            rows.push(Value::Object(object));
        }
        tracing::trace!(
            table = data.table.name(),
            total,
            first,
            rows = rows.len(),
            "rendered page"
        );

        Ok(json!({
            "total": total,
            "first": first,
            "rows": rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::TableColumn;
    use crate::model::{shared, SimpleTableModel};
    use chrono::NaiveDate;
    use webgrid_core::{BufferedResponse, CellValue, RequestArgs, ValueKind};

    fn table() -> Table {
        let mut model = SimpleTableModel::new(3);
        for i in 0..6_i64 {
            model.push_row([
                CellValue::from(format!("item{i}")),
                CellValue::Integer(i * 10),
                CellValue::Empty,
            ]);
        }
        Table::named(
            "items",
            [
                TableColumn::new("name", "Name"),
                TableColumn::new("price", "Price").kind(ValueKind::Integer),
                TableColumn::new("since", "Since").kind(ValueKind::Date),
            ],
            shared(model),
        )
    }

    fn load(table: &Table, query: &str) -> Value {
        let mut response = BufferedResponse::new();
        table
            .handle_ajax_request(&RequestArgs::from_query(query), &mut response)
            .unwrap();
        assert_eq!(response.content_type(), Some(CONTENT_TYPE));
        serde_json::from_slice(response.body()).unwrap()
    }

    // ===== Attach Tests =====

    #[test]
    fn test_attach_rejects_invalid_table() {
        let table = Table::builder().column(TableColumn::new("a", "A")).build();
        assert_eq!(JsonRenderer::attach(&table), Err(ConfigurationError::NoModel));
        assert!(table.before_load().is_empty());
    }

    #[test]
    fn test_attach_subscribes_once() {
        let table = table();
        JsonRenderer::attach(&table).unwrap();
        assert_eq!(table.before_load().subscriber_count(), 1);
    }

    // ===== Render Tests =====

    #[test]
    fn test_render_page() {
        let table = table();
        JsonRenderer::attach(&table).unwrap();
        let body = load(&table, "start=4&limit=5");
        assert_eq!(body["total"], 6);
        assert_eq!(body["first"], 4);
        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "item4");
        assert_eq!(rows[1]["price"], 50);
        assert!(rows[1]["since"].is_null());
    }

    #[test]
    fn test_render_all_rows_without_args() {
        let table = table();
        JsonRenderer::attach(&table).unwrap();
        let body = load(&table, "");
        assert_eq!(body["first"], 0);
        assert_eq!(body["rows"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_render_dates_as_iso() {
        let table = table();
        JsonRenderer::attach(&table).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        table.set_value(date, 0, 2).unwrap();
        let body = load(&table, "ev=load&limit=1");
        assert_eq!(body["rows"][0]["since"], "2024-02-29");
    }

    #[test]
    fn test_render_past_end_is_empty_page() {
        let table = table();
        JsonRenderer::attach(&table).unwrap();
        let body = load(&table, "start=100");
        assert_eq!(body["first"], 6);
        assert!(body["rows"].as_array().unwrap().is_empty());
    }
}
