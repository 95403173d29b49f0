//! Core types for the webgrid table widget.
//!
//! This crate provides the pieces the widget crate builds on:
//! - Cell values: [`CellValue`], [`ValueKind`]
//! - Typed synchronous event channels: [`Channel`], [`Subscribers`]
//! - The wire protocol table and request/response abstractions:
//!   [`Protocol`], [`RequestArgs`], [`ResponseSink`]
//! - Error taxonomy: [`TableError`] and friends

pub mod channel;
mod error;
pub mod protocol;
mod value;
mod widget;

pub use channel::{BoxError, Channel, HandlerResult, SubscriptionId, Subscribers};
pub use error::{
    ChannelError, ConfigurationError, ModelError, ProtocolError, Result, TableError,
    ValueParseError,
};
pub use protocol::{protocol, BufferedResponse, Protocol, RequestArgs, ResponseSink};
pub use value::{CellValue, ValueKind, DATE_FORMAT};
pub use widget::{WidgetId, WidgetKind};
