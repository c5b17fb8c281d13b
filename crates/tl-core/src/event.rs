//! Timeline events as seen by the matching and navigation core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EventId;

/// Read access to an event owned by the timeline engine.
///
/// The core never mutates events. Filtering and highlighting only look at the
/// ID, navigation only looks at the start time.
pub trait TimelineEvent {
    /// Returns the text that filter and highlight patterns are matched against.
    fn event_id(&self) -> &str;

    /// Returns the event's start time.
    fn start(&self) -> DateTime<Utc>;
}

impl<E: TimelineEvent + ?Sized> TimelineEvent for &E {
    fn event_id(&self) -> &str {
        (**self).event_id()
    }

    fn start(&self) -> DateTime<Utc> {
        (**self).start()
    }
}

/// A dated, identified record placed on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier, also the match target for filters and highlights.
    pub id: EventId,
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// Optional label shown by renderers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Event {
    /// Creates an event without a title.
    pub const fn new(id: EventId, start: DateTime<Utc>) -> Self {
        Self {
            id,
            start,
            title: None,
        }
    }
}

impl TimelineEvent for Event {
    fn event_id(&self) -> &str {
        self.id.as_str()
    }

    fn start(&self) -> DateTime<Utc> {
        self.start
    }
}
