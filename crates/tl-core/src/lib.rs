//! Filter, highlight and navigation engine for multi-band event timelines.
//!
//! This crate contains:
//! - Matcher building: filter and highlight text fields compiled into predicates
//! - Scheduling: single-slot timers that debounce recomputation and relayout
//! - Navigation: stepping to the next/previous visible event
//! - The panel controller tying those to a timeline engine
//! - An in-memory timeline engine for headless use

pub mod controller;
pub mod engine;
mod event;
pub mod matcher;
pub mod memory;
pub mod navigation;
pub mod scheduler;
pub mod theme;
mod types;

pub use controller::{
    Action, ActionOutcome, MatcherSummary, PanelConfig, PanelController, PanelError, TimerFired,
};
pub use event::{Event, TimelineEvent};
pub use matcher::{
    ActiveMatchers, FieldKind, FilterPredicate, HighlightPredicate, MatcherError, build_matchers,
};
pub use navigation::{Direction, NAVIGATION_GUARD, find_adjacent_event_date};
pub use theme::Theme;
pub use types::{EventId, ValidationError};
