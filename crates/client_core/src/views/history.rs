use std::fmt::Write as _;

use shared::protocol::HistoryEntry;

use super::{Region, View};
use crate::{copy::UiCopy, markup::escape_html};

/// Rolling classification history. Every load replaces the list wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryView {
    pub entries: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Clone)]
pub enum HistoryEvent {
    Replaced(Option<Vec<HistoryEntry>>),
}

impl HistoryView {
    pub fn is_empty(&self) -> bool {
        self.entries.as_ref().map_or(true, |entries| entries.is_empty())
    }
}

impl View for HistoryView {
    type Event = HistoryEvent;

    const REGION: Region = Region::History;

    fn apply(&mut self, event: HistoryEvent) {
        match event {
            HistoryEvent::Replaced(entries) => self.entries = entries,
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::from(r#"<div id="history-list">"#);
        match self.entries.as_deref() {
            Some(entries) if !entries.is_empty() => {
                for entry in entries {
                    render_entry(&mut out, entry, copy);
                }
            }
            _ => {
                let _ = write!(
                    out,
                    r#"<div class="history-item">{}</div>"#,
                    escape_html(copy.history_empty)
                );
            }
        }
        out.push_str("</div>");
        out
    }
}

fn render_entry(out: &mut String, entry: &HistoryEntry, copy: &UiCopy) {
    let _ = write!(
        out,
        r#"<div class="history-item"><p><strong>{}</strong> {}</p><p><strong>{}</strong> {}</p><p><strong>{}</strong> {}</p><p><strong>{}</strong> {}</p><p><strong>{}</strong> {}</p></div>"#,
        escape_html(copy.label_text),
        escape_html(&entry.text),
        escape_html(copy.label_main_category),
        escape_html(&entry.main_category),
        escape_html(copy.label_sub_categories),
        escape_html(&entry.sub_categories.joined(copy.list_separator)),
        escape_html(copy.label_confidence),
        copy.format_percent(entry.confidence),
        escape_html(copy.label_time),
        escape_html(&copy.format_timestamp(&entry.timestamp.0)),
    );
}
