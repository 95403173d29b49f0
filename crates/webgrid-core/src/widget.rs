//! Widget identity.
//!
//! The widget tree itself lives outside this crate; a widget only needs a
//! stable id, a name the request dispatcher can route on, and a kind
//! discriminator that lets renderers tell widget flavours apart.
//!
//! # Examples
//!
//! ```
//! use webgrid_core::{WidgetId, WidgetKind};
//!
//! let a = WidgetId::next();
//! let b = WidgetId::next();
//! assert_ne!(a, b);
//!
//! assert_eq!(WidgetKind::TABLE.as_str(), "table");
//! assert_eq!(WidgetKind::new("pivot").to_string(), "pivot");
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

impl WidgetId {
    /// Create a widget ID from a known value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocate a process-unique ID.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Widget flavour, used where a subclass would otherwise be needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetKind(Cow<'static, str>);

impl WidgetKind {
    pub const TABLE: Self = Self(Cow::Borrowed("table"));

    #[must_use]
    pub fn new(kind: impl Into<Cow<'static, str>>) -> Self {
        Self(kind.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WidgetKind {
    fn default() -> Self {
        Self::TABLE
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
