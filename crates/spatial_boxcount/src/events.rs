//! Event types and sinks for observing analysis runs.
//!
//! Diagnostics are passed into each call as an explicit [`EventSink`] instead of a process-wide
//! verbosity switch. This module defines [`BoxcountEvent`] and sinks to drop, collect, forward,
//! or fan out events emitted by [`crate::scan::scan_all_scales`] and
//! [`crate::dimension::estimate_with_events`].
use std::time::Duration;

use crate::scale::Scale;

/// Describes events emitted by analysis operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum BoxcountEvent {
    /// Emitted before the scales of a multi-scale scan are dispatched.
    RunStarted {
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
        /// Exclusive value bound of the grid.
        max_value: u32,
        /// Scales that will be scanned.
        scales: Vec<Scale>,
    },

    /// Emitted once per scale after all workers joined.
    ScaleFinished {
        /// The scanned scale.
        scale: Scale,
        /// Tiles passed to the box-count kernel.
        tiles_evaluated: usize,
        /// Partial edge tiles left at zero.
        tiles_skipped: usize,
        /// Wall time of this scale's scan.
        elapsed: Duration,
    },

    /// Emitted when a multi-scale scan completed successfully.
    RunFinished {
        /// Number of scales in the result.
        scale_count: usize,
        /// Total wall time.
        elapsed: Duration,
    },

    /// Emitted for every box size evaluated by the dimension estimator.
    DimensionPoint {
        /// Box size used.
        box_size: u32,
        /// Global occupied bin count; zero counts are excluded from the fit.
        occupied_bins: usize,
    },

    /// Non-fatal warning.
    Warning {
        /// Context string (e.g. scale index).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`BoxcountEvent`], used to filter before building payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxcountEventKind {
    RunStarted,
    ScaleFinished,
    RunFinished,
    DimensionPoint,
    Warning,
}

impl BoxcountEvent {
    pub fn kind(&self) -> BoxcountEventKind {
        match self {
            BoxcountEvent::RunStarted { .. } => BoxcountEventKind::RunStarted,
            BoxcountEvent::ScaleFinished { .. } => BoxcountEventKind::ScaleFinished,
            BoxcountEvent::RunFinished { .. } => BoxcountEventKind::RunFinished,
            BoxcountEvent::DimensionPoint { .. } => BoxcountEventKind::DimensionPoint,
            BoxcountEvent::Warning { .. } => BoxcountEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`BoxcountEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: BoxcountEvent);

    /// Whether events of `kind` should be built and sent at all.
    fn wants(&self, _kind: BoxcountEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = BoxcountEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: BoxcountEvent) {}

    #[inline]
    fn wants(&self, _kind: BoxcountEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(BoxcountEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(BoxcountEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(BoxcountEvent),
{
    #[inline]
    fn send(&mut self, event: BoxcountEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<BoxcountEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
        }
    }

    pub fn into_inner(self) -> Vec<BoxcountEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[BoxcountEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: BoxcountEvent) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: BoxcountEvent) {
        let Some((last, rest)) = self.sinks.split_last_mut() else {
            return;
        };
        for sink in rest {
            if sink.wants(event.kind()) {
                sink.send(event.clone());
            }
        }
        if last.wants(event.kind()) {
            last.send(event);
        }
    }

    fn wants(&self, kind: BoxcountEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
