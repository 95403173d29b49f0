//! Wire protocol shared with the client-side table.
//!
//! Field names, event ids and load-argument names form a versioned contract
//! with the browser code. They live in one immutable [`Protocol`] table,
//! installed at most once per process and read through [`protocol()`].
//!
//! ```toml
//! # every key is optional; missing ones keep their defaults
//! [fields]
//! row = "r"
//! col = "c"
//!
//! [args]
//! first_row = "offset"
//! ```

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::sync::OnceLock;

/// Names of the form fields a table understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    pub col: String,
    pub row: String,
    pub val: String,
    /// Number of fields that make up one batched submission.
    pub cnt: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            col: "col".into(),
            row: "row".into(),
            val: "val".into(),
            cnt: "cnt".into(),
        }
    }
}

/// Event ids carried by asynchronous requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventNames {
    /// Argument holding the event id.
    pub key: String,
    pub cell_clicked: String,
    pub row_clicked: String,
    pub cell_value_changed: String,
    pub load_data: String,
    pub after_load: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            key: "ev".into(),
            cell_clicked: "click".into(),
            row_clicked: "row".into(),
            cell_value_changed: "edit".into(),
            load_data: "load".into(),
            after_load: "afterload".into(),
        }
    }
}

/// Argument names selecting the row window of a load request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadArgs {
    pub first_row: String,
    pub row_count: String,
}

impl Default for LoadArgs {
    fn default() -> Self {
        Self {
            first_row: "start".into(),
            row_count: "limit".into(),
        }
    }
}

/// The complete name table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Protocol {
    pub fields: FieldNames,
    pub events: EventNames,
    pub args: LoadArgs,
}

impl Protocol {
    /// Parse a (possibly partial) table from TOML and validate it.
    pub fn from_toml(source: &str) -> Result<Self, ProtocolError> {
        let protocol: Self = toml::from_str(source)?;
        protocol.validate()?;
        Ok(protocol)
    }

    /// Reject empty names and ambiguous form fields.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let named = [
            ("fields.col", &self.fields.col),
            ("fields.row", &self.fields.row),
            ("fields.val", &self.fields.val),
            ("fields.cnt", &self.fields.cnt),
            ("events.key", &self.events.key),
            ("events.cell_clicked", &self.events.cell_clicked),
            ("events.row_clicked", &self.events.row_clicked),
            ("events.cell_value_changed", &self.events.cell_value_changed),
            ("events.load_data", &self.events.load_data),
            ("events.after_load", &self.events.after_load),
            ("args.first_row", &self.args.first_row),
            ("args.row_count", &self.args.row_count),
        ];
        if let Some((key, _)) = named.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ProtocolError::Invalid(format!("{key} is empty")));
        }

        let fields = [
            &self.fields.col,
            &self.fields.row,
            &self.fields.val,
            &self.fields.cnt,
        ];
        for (i, a) in fields.iter().enumerate() {
            if fields[i + 1..].contains(a) {
                return Err(ProtocolError::Invalid(format!("form field {a:?} used twice")));
            }
        }

        let events = [
            &self.events.cell_clicked,
            &self.events.row_clicked,
            &self.events.cell_value_changed,
            &self.events.load_data,
            &self.events.after_load,
        ];
        for (i, a) in events.iter().enumerate() {
            if events[i + 1..].contains(a) {
                return Err(ProtocolError::Invalid(format!("event id {a:?} used twice")));
            }
        }

        if self.args.first_row == self.args.row_count {
            return Err(ProtocolError::Invalid(
                "load arguments must be distinct".into(),
            ));
        }
        Ok(())
    }
}

static PROTOCOL: OnceLock<Protocol> = OnceLock::new();

/// Install the process-wide table. Must run before the first [`protocol()`].
pub fn install(protocol: Protocol) -> Result<(), ProtocolError> {
    protocol.validate()?;
    PROTOCOL
        .set(protocol)
        .map_err(|_| ProtocolError::AlreadyInstalled)?;
    tracing::debug!("protocol table installed");
    Ok(())
}

/// The process-wide table, defaults unless [`install`] ran first.
pub fn protocol() -> &'static Protocol {
    PROTOCOL.get_or_init(Protocol::default)
}

/// Flat name → value mapping of an asynchronous request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestArgs {
    values: HashMap<String, String>,
}

impl RequestArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` string.
    ///
    /// A repeated name keeps its last value.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Read a zero-based index or count. Absent, negative and malformed
    /// values all read as `None`.
    #[must_use]
    pub fn parse_index(&self, name: &str) -> Option<usize> {
        self.get(name).and_then(parse_index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a client-supplied index. Negative numbers mean "unspecified".
#[must_use]
pub fn parse_index(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

/// Request-scoped destination for a rendered response.
pub trait ResponseSink: io::Write {
    fn set_content_type(&mut self, content_type: &str);
}

/// In-memory response, used by tests and by servers that buffer bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedResponse {
    content_type: Option<String>,
    body: Vec<u8>,
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8, lossy.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

impl io::Write for BufferedResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for BufferedResponse {
    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }
}
