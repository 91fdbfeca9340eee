//! Per-region view models: state, reducer-style `apply`, and pure `render` to markup.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::warn;

use crate::copy::UiCopy;

pub mod annotation;
pub mod annotation_stats;
pub mod classification;
pub mod history;
pub mod notifications;
pub mod suggestion;
pub mod tabs;
pub mod training;

/// Display regions. Each one is written by exactly one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Classification,
    History,
    AnnotationForm,
    AnnotationTable,
    AnnotationStats,
    Suggestion,
    TrainingStatus,
    Notifications,
    Tabs,
}

impl Region {
    pub const ALL: [Region; 9] = [
        Region::Tabs,
        Region::Classification,
        Region::History,
        Region::AnnotationForm,
        Region::AnnotationTable,
        Region::AnnotationStats,
        Region::Suggestion,
        Region::TrainingStatus,
        Region::Notifications,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Classification => "classification",
            Region::History => "history",
            Region::AnnotationForm => "annotation_form",
            Region::AnnotationTable => "annotation_table",
            Region::AnnotationStats => "annotation_stats",
            Region::Suggestion => "suggestion",
            Region::TrainingStatus => "training_status",
            Region::Notifications => "notifications",
            Region::Tabs => "tabs",
        }
    }
}

/// Broadcast after every state change so adapters can re-render one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewUpdate {
    pub region: Region,
}

pub trait View: Send + 'static {
    type Event;

    const REGION: Region;

    fn apply(&mut self, event: Self::Event);

    fn render(&self, copy: &UiCopy) -> String;
}

/// Owns one region's state and announces every applied event.
pub struct RegionStore<V: View> {
    state: Mutex<V>,
    updates: broadcast::Sender<ViewUpdate>,
}

impl<V: View> RegionStore<V> {
    pub fn new(state: V, updates: broadcast::Sender<ViewUpdate>) -> Self {
        Self {
            state: Mutex::new(state),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, V> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!(region = V::REGION.name(), "view state lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    pub fn apply(&self, event: V::Event) {
        self.lock().apply(event);
        // No subscribers is fine; nothing is rendering yet.
        let _ = self.updates.send(ViewUpdate { region: V::REGION });
    }

    pub fn read<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.lock())
    }

    pub fn render(&self, copy: &UiCopy) -> String {
        self.lock().render(copy)
    }
}

impl<V: View + Clone> RegionStore<V> {
    pub fn snapshot(&self) -> V {
        self.lock().clone()
    }
}
