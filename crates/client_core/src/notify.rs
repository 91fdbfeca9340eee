//! Transient user-facing notifications with timed removal.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::domain::Severity;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::views::{
    notifications::{Notification, NotificationEvent, NotificationsView},
    RegionStore,
};

pub struct Notifier {
    store: Arc<RegionStore<NotificationsView>>,
    ttl: Duration,
    next_id: AtomicU64,
}

impl Notifier {
    pub fn new(store: Arc<RegionStore<NotificationsView>>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &Arc<RegionStore<NotificationsView>> {
        &self.store
    }

    /// Appends immediately and schedules removal after the configured TTL.
    /// Concurrent notifications stack; nothing replaces an earlier one.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = message.into();
        debug!(id, severity = severity.css_class(), %message, "notification shown");
        self.store.apply(NotificationEvent::Pushed(Notification {
            id,
            message,
            severity,
        }));

        match Handle::try_current() {
            Ok(handle) => {
                let store = Arc::clone(&self.store);
                let ttl = self.ttl;
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    store.apply(NotificationEvent::Expired(id));
                });
            }
            Err(_) => warn!(id, "no async runtime; notification will not auto-dismiss"),
        }
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Error)
    }
}
