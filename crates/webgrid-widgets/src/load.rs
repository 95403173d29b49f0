//! Before-load notification.
//!
//! A load request hands the renderer a mutable borrow of the response, which
//! a plain [`Channel`](webgrid_core::Channel) cannot express. [`LoadChannel`]
//! reuses the same subscriber storage, so ordering and failure handling are
//! identical.

use crate::table::Table;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use webgrid_core::{ChannelError, HandlerResult, ResponseSink, SubscriptionId, Subscribers};

/// Payload of a before-load event.
///
/// Lives only for the duration of one request; the response is never stored.
pub struct LoadData<'a> {
    pub response: &'a mut dyn ResponseSink,
    pub table: &'a Table,
    /// First row requested, `None` for "from the start"
    pub first_row: Option<usize>,
    /// Number of rows requested, `None` for "all"
    pub row_count: Option<usize>,
}

impl LoadData<'_> {
    /// Requested rows clamped to a model holding `total` rows.
    #[must_use]
    pub fn row_range(&self, total: usize) -> Range<usize> {
        let start = self.first_row.unwrap_or(0).min(total);
        let end = self
            .row_count
            .map_or(total, |count| start.saturating_add(count).min(total));
        start..end
    }
}

impl fmt::Debug for LoadData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadData")
            .field("table", &self.table.name())
            .field("first_row", &self.first_row)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

type LoadHandler = dyn for<'a, 'b> Fn(&'b mut LoadData<'a>) -> HandlerResult + Send + Sync;

/// Channel fired before a table's data is loaded.
///
/// Normally the renderer is its only subscriber.
pub struct LoadChannel {
    name: &'static str,
    subscribers: Subscribers<LoadHandler>,
}

impl LoadChannel {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "beforeLoad",
            subscribers: Subscribers::new(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: for<'a, 'b> Fn(&'b mut LoadData<'a>) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribers.insert(Arc::new(callback))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn clear(&self) {
        self.subscribers.clear();
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Invoke every subscriber with `data`, in subscription order.
    pub fn fire(&self, data: &mut LoadData<'_>) -> Result<usize, ChannelError> {
        match self.subscribers.len() {
            0 => tracing::warn!(
                table = data.table.name(),
                "no before-load subscriber, nothing will be rendered"
            ),
            1 => {}
            n => tracing::debug!(
                table = data.table.name(),
                subscribers = n,
                "several before-load subscribers"
            ),
        }
        self.subscribers
            .dispatch(self.name, |callback| callback(&mut *data))
    }
}

impl Default for LoadChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoadChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadChannel")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
