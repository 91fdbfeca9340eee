use std::fmt::Write as _;

use shared::domain::Severity;

use super::{Region, View};
use crate::{copy::UiCopy, markup::escape_html};

/// Where notifications are mounted when no container is configured.
pub const DOCUMENT_ROOT: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Visible notifications in insertion order. No de-duplication or cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationsView {
    pub container: Option<String>,
    pub items: Vec<Notification>,
}

#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Pushed(Notification),
    Expired(u64),
}

impl NotificationsView {
    pub fn new(container: Option<String>) -> Self {
        Self {
            container,
            items: Vec::new(),
        }
    }

    pub fn target(&self) -> &str {
        self.container.as_deref().unwrap_or(DOCUMENT_ROOT)
    }

    pub fn messages(&self) -> Vec<&str> {
        self.items.iter().map(|n| n.message.as_str()).collect()
    }
}

impl View for NotificationsView {
    type Event = NotificationEvent;

    const REGION: Region = Region::Notifications;

    fn apply(&mut self, event: NotificationEvent) {
        match event {
            NotificationEvent::Pushed(notification) => self.items.push(notification),
            NotificationEvent::Expired(id) => self.items.retain(|n| n.id != id),
        }
    }

    fn render(&self, _copy: &UiCopy) -> String {
        let mut out = format!(
            r#"<div class="notifications" data-container="{}">"#,
            escape_html(self.target())
        );
        for notification in &self.items {
            let _ = write!(
                out,
                r#"<div class="notification {}">{}</div>"#,
                notification.severity.css_class(),
                escape_html(&notification.message)
            );
        }
        out.push_str("</div>");
        out
    }
}
