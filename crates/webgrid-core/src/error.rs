//! Error types for webgrid.

use crate::channel::{BoxError, SubscriptionId};
use crate::value::ValueKind;
use thiserror::Error;

/// The widget is not usable until its configuration is corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("table has no columns")]
    NoColumns,

    #[error("table has no model")]
    NoModel,

    #[error("table defines {columns} column(s) but its model reports {model_columns}")]
    ColumnMismatch { columns: usize, model_columns: usize },
}

/// Errors reported by a table model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Cell position outside the model's reported extent.
    #[error("cell ({row}, {col}) out of range for {rows}x{cols} model")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// A subscriber failed while a channel was firing.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("subscriber {subscription} on '{channel}' failed: {source}")]
    SubscriberFailed {
        channel: String,
        subscription: SubscriptionId,
        #[source]
        source: BoxError,
    },
}

impl ChannelError {
    /// Name of the channel that was firing.
    #[must_use]
    pub fn channel(&self) -> &str {
        match self {
            Self::SubscriberFailed { channel, .. } => channel,
        }
    }
}

/// Raw client text that does not decode as the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {raw:?} as {kind}")]
pub struct ValueParseError {
    pub kind: ValueKind,
    pub raw: String,
}

impl ValueParseError {
    #[must_use]
    pub fn new(kind: ValueKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// Errors raised while loading or installing the wire protocol table.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("protocol table already installed")]
    AlreadyInstalled,

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid protocol table: {0}")]
    Invalid(String),
}

/// Errors surfaced by table operations.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Result alias for table operations.
pub type Result<T, E = TableError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        assert_eq!(ConfigurationError::NoColumns.to_string(), "table has no columns");
        assert_eq!(ConfigurationError::NoModel.to_string(), "table has no model");
        let err = ConfigurationError::ColumnMismatch {
            columns: 2,
            model_columns: 3,
        };
        assert_eq!(
            err.to_string(),
            "table defines 2 column(s) but its model reports 3"
        );
    }

    #[test]
    fn test_model_error_display() {
        let err = ModelError::OutOfRange {
            row: 5,
            col: 1,
            rows: 3,
            cols: 2,
        };
        assert_eq!(err.to_string(), "cell (5, 1) out of range for 3x2 model");
    }

    #[test]
    fn test_table_error_from_model_keeps_variant() {
        let err: TableError = ModelError::OutOfRange {
            row: 0,
            col: 9,
            rows: 1,
            cols: 1,
        }
        .into();
        assert!(matches!(
            err,
            TableError::Model(ModelError::OutOfRange { col: 9, .. })
        ));
        assert!(err.to_string().starts_with("model error"));
    }

    #[test]
    fn test_table_error_channel_is_transparent() {
        let err: TableError = ChannelError::SubscriberFailed {
            channel: "cellClicked".into(),
            subscription: SubscriptionId::from_raw(3),
            source: "boom".into(),
        }
        .into();
        assert_eq!(err.to_string(), "subscriber #3 on 'cellClicked' failed: boom");
    }

    #[test]
    fn test_channel_error_source() {
        use std::error::Error as _;
        let err = ChannelError::SubscriberFailed {
            channel: "rowClicked".into(),
            subscription: SubscriptionId::from_raw(1),
            source: "inner".into(),
        };
        assert_eq!(err.channel(), "rowClicked");
        assert_eq!(err.source().map(ToString::to_string), Some("inner".into()));
    }

    #[test]
    fn test_value_parse_error_display() {
        let err = ValueParseError::new(ValueKind::Integer, "x1");
        assert_eq!(err.to_string(), "cannot parse \"x1\" as integer");
    }
}
