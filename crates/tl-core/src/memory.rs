//! In-memory timeline engine.
//!
//! Keeps bands, painters and events as plain data so the panel controller can
//! be driven headless, from tests and from the command line. Overview bands
//! follow the band they are synced with whenever the timeline is painted or
//! laid out.

use chrono::{DateTime, Utc};

use crate::engine::{Band, EventPainter, EventSource, Timeline};
use crate::event::{Event, TimelineEvent};
use crate::matcher::{FilterPredicate, HighlightPredicate};

/// Events ordered by start time.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSource {
    events: Vec<Event>,
}

impl MemoryEventSource {
    /// Sorts `events` by start time. Events starting together keep their
    /// input order.
    pub fn new(mut events: Vec<Event>) -> Self {
        events.sort_by_key(|event| event.start);
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for MemoryEventSource {
    type Event = Event;

    fn all_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

/// Painter that records the predicates it was given.
#[derive(Debug, Clone, Default)]
pub struct MemoryPainter {
    filter: Option<FilterPredicate>,
    highlight: Option<HighlightPredicate>,
}

impl MemoryPainter {
    pub const fn filter(&self) -> Option<&FilterPredicate> {
        self.filter.as_ref()
    }

    pub const fn highlight(&self) -> Option<&HighlightPredicate> {
        self.highlight.as_ref()
    }

    pub fn is_visible<E: TimelineEvent + ?Sized>(&self, event: &E) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(event))
    }

    pub fn highlight_category<E: TimelineEvent + ?Sized>(&self, event: &E) -> Option<usize> {
        self.highlight.as_ref().and_then(|h| h.category(event))
    }
}

impl EventPainter for MemoryPainter {
    fn set_filter_matcher(&mut self, matcher: Option<FilterPredicate>) {
        self.filter = matcher;
    }

    fn set_highlight_matcher(&mut self, matcher: Option<HighlightPredicate>) {
        self.highlight = matcher;
    }
}

/// How a band relates to the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandInfo {
    /// Overview bands show a coarser scale and are never navigated directly.
    pub overview: bool,
    /// Band whose center this band follows.
    pub sync_with: Option<usize>,
}

impl BandInfo {
    pub const fn primary() -> Self {
        Self {
            overview: false,
            sync_with: None,
        }
    }

    pub const fn overview_of(band: usize) -> Self {
        Self {
            overview: true,
            sync_with: Some(band),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryBand {
    info: BandInfo,
    center: DateTime<Utc>,
    painter: MemoryPainter,
}

impl MemoryBand {
    pub const fn info(&self) -> BandInfo {
        self.info
    }

    pub const fn painter(&self) -> &MemoryPainter {
        &self.painter
    }
}

impl Band for MemoryBand {
    fn event_painter(&mut self) -> &mut dyn EventPainter {
        &mut self.painter
    }

    fn center_visible_date(&self) -> DateTime<Utc> {
        self.center
    }

    fn set_center_visible_date(&mut self, date: DateTime<Utc>) {
        self.center = date;
    }
}

#[derive(Debug, Clone)]
pub struct MemoryTimeline {
    bands: Vec<MemoryBand>,
    source: MemoryEventSource,
    paint_count: usize,
    layout_count: usize,
}

impl MemoryTimeline {
    /// Builds a timeline with one band per entry of `infos`, all centered on
    /// `center`.
    pub fn new(source: MemoryEventSource, infos: &[BandInfo], center: DateTime<Utc>) -> Self {
        let bands = infos
            .iter()
            .map(|&info| MemoryBand {
                info,
                center,
                painter: MemoryPainter::default(),
            })
            .collect();
        Self {
            bands,
            source,
            paint_count: 0,
            layout_count: 0,
        }
    }

    /// One primary band followed by `overviews` bands synced with it.
    pub fn with_overviews(
        source: MemoryEventSource,
        center: DateTime<Utc>,
        overviews: usize,
    ) -> Self {
        let infos: Vec<BandInfo> = std::iter::once(BandInfo::primary())
            .chain(std::iter::repeat_n(BandInfo::overview_of(0), overviews))
            .collect();
        Self::new(source, &infos, center)
    }

    pub fn bands(&self) -> &[MemoryBand] {
        &self.bands
    }

    pub const fn paint_count(&self) -> usize {
        self.paint_count
    }

    pub const fn layout_count(&self) -> usize {
        self.layout_count
    }

    /// Events the given band currently shows, with their highlight category.
    pub fn visible_events(&self, band: usize) -> Vec<(&Event, Option<usize>)> {
        let Some(band) = self.bands.get(band) else {
            return Vec::new();
        };
        self.source
            .all_events()
            .filter(|event| band.painter.is_visible(*event))
            .map(|event| (event, band.painter.highlight_category(event)))
            .collect()
    }

    fn sync_bands(&mut self) {
        for index in 0..self.bands.len() {
            let Some(leader) = self.bands[index].info.sync_with else {
                continue;
            };
            if leader == index {
                continue;
            }
            if let Some(center) = self.bands.get(leader).map(|band| band.center) {
                self.bands[index].center = center;
            }
        }
    }
}

impl Timeline for MemoryTimeline {
    type Source = MemoryEventSource;

    fn band_count(&self) -> usize {
        self.bands.len()
    }

    fn band(&self, index: usize) -> Option<&dyn Band> {
        self.bands.get(index).map(|band| band as &dyn Band)
    }

    fn band_mut(&mut self, index: usize) -> Option<&mut dyn Band> {
        self.bands.get_mut(index).map(|band| band as &mut dyn Band)
    }

    fn event_source(&self) -> &MemoryEventSource {
        &self.source
    }

    fn paint(&mut self) {
        self.sync_bands();
        self.paint_count += 1;
    }

    fn layout(&mut self) {
        self.sync_bands();
        self.layout_count += 1;
    }
}
