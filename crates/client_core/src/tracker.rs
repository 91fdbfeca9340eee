//! Per-flow request generations and in-flight counts.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Classify,
    History,
    Annotate,
    Annotations,
    AnnotationStats,
    Retrain,
    Suggestion,
    TrainingOverview,
    Import,
    Export,
    Evaluate,
}

impl Flow {
    pub fn name(self) -> &'static str {
        match self {
            Flow::Classify => "classify",
            Flow::History => "history",
            Flow::Annotate => "annotate",
            Flow::Annotations => "annotations",
            Flow::AnnotationStats => "annotation_stats",
            Flow::Retrain => "retrain",
            Flow::Suggestion => "suggestion",
            Flow::TrainingOverview => "training_overview",
            Flow::Import => "import",
            Flow::Export => "export",
            Flow::Evaluate => "evaluate",
        }
    }
}

#[derive(Debug)]
pub struct FlowTracker {
    flow: Flow,
    latest: AtomicU64,
    in_flight: AtomicUsize,
}

impl FlowTracker {
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            latest: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn begin(&self) -> FlowTicket<'_> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(flow = self.flow.name(), generation, in_flight, "flow started");
        FlowTicket {
            tracker: self,
            generation,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

/// Held for the duration of one invocation; releases its in-flight slot on drop.
#[derive(Debug)]
pub struct FlowTicket<'a> {
    tracker: &'a FlowTracker,
    generation: u64,
}

impl FlowTicket<'_> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn flow(&self) -> Flow {
        self.tracker.flow
    }

    /// False once a newer invocation of the same flow has started.
    pub fn is_current(&self) -> bool {
        self.tracker.latest_generation() == self.generation
    }
}

impl Drop for FlowTicket<'_> {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
