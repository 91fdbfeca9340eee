use std::fmt::Write as _;

use shared::protocol::{ClassificationPayload, SubCategories};

use super::{Region, View};
use crate::{
    copy::UiCopy,
    markup::{escape_html, labelled_row, or_placeholder},
};

/// A classification with every optional field already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    /// `None` renders as the locale's "unknown".
    pub category: Option<String>,
    pub sub_categories: SubCategories,
    pub confidence: f64,
}

impl From<ClassificationPayload> for ClassificationResult {
    fn from(payload: ClassificationPayload) -> Self {
        Self {
            category: payload.category.filter(|c| !c.is_empty()),
            sub_categories: payload.sub_categories.unwrap_or_default(),
            confidence: payload
                .confidence
                .filter(|c| c.is_finite())
                .unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedClassification {
    /// Echo of the submitted text so the panel stays readable after the input is cleared.
    pub input_text: String,
    pub result: ClassificationResult,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationView {
    pub visible: bool,
    pub loading: bool,
    pub displayed: Option<DisplayedClassification>,
}

#[derive(Debug, Clone)]
pub enum ClassificationEvent {
    Started,
    Completed(DisplayedClassification),
    /// Loading indicator off without touching the displayed result.
    Settled,
}

impl View for ClassificationView {
    type Event = ClassificationEvent;

    const REGION: Region = Region::Classification;

    fn apply(&mut self, event: ClassificationEvent) {
        match event {
            ClassificationEvent::Started => {
                self.visible = true;
                self.loading = true;
            }
            ClassificationEvent::Completed(displayed) => {
                self.visible = true;
                self.loading = false;
                self.displayed = Some(displayed);
            }
            ClassificationEvent::Settled => self.loading = false,
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<div class="loader{}">{}</div>"#,
            if self.loading { "" } else { " hidden" },
            escape_html(copy.label_loading)
        );
        let _ = write!(
            out,
            r#"<div id="result"{}><div class="result-content">"#,
            if self.visible { "" } else { r#" class="hidden""# }
        );
        if let Some(displayed) = &self.displayed {
            render_result(&mut out, displayed, copy);
        }
        out.push_str("</div></div>");
        out
    }
}

fn render_result(out: &mut String, displayed: &DisplayedClassification, copy: &UiCopy) {
    let result = &displayed.result;
    labelled_row(out, "result", copy.label_input_text, &displayed.input_text);
    labelled_row(
        out,
        "result",
        copy.label_main_category,
        or_placeholder(result.category.as_deref(), copy.unknown),
    );
    labelled_row(
        out,
        "result",
        copy.label_sub_categories,
        &result.sub_categories.joined_or_json(copy.list_separator),
    );
    labelled_row(
        out,
        "result",
        copy.label_confidence,
        &copy.format_percent(result.confidence),
    );
}
