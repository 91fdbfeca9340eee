use std::fmt::Write as _;

use shared::protocol::AnnotationStatsResponse;

use super::{Region, View};
use crate::{copy::UiCopy, markup::escape_html};

/// Human annotation activity. `None` until the first successful load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStatsView {
    pub stats: Option<AnnotationStatsResponse>,
}

#[derive(Debug, Clone)]
pub enum AnnotationStatsEvent {
    Loaded(AnnotationStatsResponse),
}

impl View for AnnotationStatsView {
    type Event = AnnotationStatsEvent;

    const REGION: Region = Region::AnnotationStats;

    fn apply(&mut self, event: AnnotationStatsEvent) {
        match event {
            AnnotationStatsEvent::Loaded(stats) => self.stats = Some(stats),
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::from(r#"<div id="annotation-stats">"#);
        match &self.stats {
            Some(stats) if !stats.daily_stats.is_empty() || !stats.annotator_stats.is_empty() => {
                // Newest day first.
                render_counts(
                    &mut out,
                    copy.annotation_stats_daily,
                    stats.daily_stats.iter().rev(),
                );
                render_counts(
                    &mut out,
                    copy.annotation_stats_annotators,
                    stats.annotator_stats.iter(),
                );
            }
            _ => {
                let _ = write!(
                    out,
                    r#"<div class="stats-empty">{}</div>"#,
                    escape_html(copy.annotation_stats_empty)
                );
            }
        }
        out.push_str("</div>");
        out
    }
}

fn render_counts<'a>(
    out: &mut String,
    label: &str,
    counts: impl Iterator<Item = (&'a String, &'a u64)>,
) {
    let _ = write!(
        out,
        r#"<div class="stats-section"><div class="stats-label">{}</div><ul>"#,
        escape_html(label)
    );
    for (key, count) in counts {
        let _ = write!(out, "<li>{}: {count}</li>", escape_html(key));
    }
    out.push_str("</ul></div>");
}
