//! Event types and sinks for observing placement runs.
//!
//! This module defines [`PlacementEvent`] and a set of sinks to emit, collect, or
//! forward events while executing a [`crate::scatter::plan::Plan`] via
//! [`crate::scatter::runner::VegetationPlacer`].
use crate::scatter::evaluator::PlacementDecision;
use crate::scatter::runner::{RunConfig, RunResult};
use crate::scatter::world::PlantInstance;
use crate::scatter::SpeciesId;

/// Describes events emitted by placement runs.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlacementEvent {
    /// Emitted when a run starts for a plan.
    RunStarted {
        /// The run configuration used.
        config: RunConfig,
        /// Number of layers in the plan.
        layer_count: usize,
    },

    /// Emitted when the entire plan finishes.
    RunFinished {
        /// Aggregated result for all layers.
        result: RunResult,
    },

    /// Emitted when a layer starts processing.
    LayerStarted {
        /// Index of the layer in the plan.
        index: usize,
        /// The layer id.
        id: String,
        /// The species configured on this layer, in predominance order.
        species: Vec<SpeciesId>,
        /// Minimum separation used for candidate sampling.
        radius: f32,
    },

    /// Emitted when a layer finishes processing.
    LayerFinished {
        index: usize,
        id: String,
        /// Summary of what was evaluated and placed in this layer.
        result: RunResult,
    },

    /// Emitted when a layer is aborted; the run continues with the next layer.
    LayerFailed {
        index: usize,
        id: String,
        message: String,
    },

    /// Emitted after a candidate point was evaluated.
    CandidateEvaluated { decision: PlacementDecision },

    /// Emitted when a plant is handed to the world.
    PlantPlaced {
        layer_index: usize,
        instance: PlantInstance,
    },

    /// Non-fatal warning generated during placement.
    Warning {
        /// Context string (e.g. layer id).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of a [`PlacementEvent`], used by sinks to opt out of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementEventKind {
    RunStarted,
    RunFinished,
    LayerStarted,
    LayerFinished,
    LayerFailed,
    CandidateEvaluated,
    PlantPlaced,
    Warning,
}

impl PlacementEvent {
    pub fn kind(&self) -> PlacementEventKind {
        match self {
            PlacementEvent::RunStarted { .. } => PlacementEventKind::RunStarted,
            PlacementEvent::RunFinished { .. } => PlacementEventKind::RunFinished,
            PlacementEvent::LayerStarted { .. } => PlacementEventKind::LayerStarted,
            PlacementEvent::LayerFinished { .. } => PlacementEventKind::LayerFinished,
            PlacementEvent::LayerFailed { .. } => PlacementEventKind::LayerFailed,
            PlacementEvent::CandidateEvaluated { .. } => PlacementEventKind::CandidateEvaluated,
            PlacementEvent::PlantPlaced { .. } => PlacementEventKind::PlantPlaced,
            PlacementEvent::Warning { .. } => PlacementEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`PlacementEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlacementEvent);

    /// Whether events of `kind` should be built at all. Per-candidate events are only
    /// constructed when this returns `true`.
    #[inline]
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PlacementEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlacementEvent) {}

    #[inline]
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlacementEvent>,
    only: Option<Vec<PlacementEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collect only the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = PlacementEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<PlacementEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlacementEvent] {
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

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: PlacementEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PlacementEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}
