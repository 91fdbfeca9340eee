use std::fmt::Write as _;

use super::{Region, View};
use crate::{copy::UiCopy, markup::escape_html};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Classify,
    Annotate,
    Training,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Classify, Tab::Annotate, Tab::Training];

    pub fn id(self) -> &'static str {
        match self {
            Tab::Classify => "classify",
            Tab::Annotate => "annotate",
            Tab::Training => "training",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Tab::ALL.into_iter().find(|tab| tab.id() == raw.trim())
    }

    fn title(self, copy: &UiCopy) -> &'static str {
        match self {
            Tab::Classify => copy.tab_classify,
            Tab::Annotate => copy.tab_annotate,
            Tab::Training => copy.tab_training,
        }
    }
}

/// Local view switching; no network effect of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabsView {
    pub active: Tab,
}

#[derive(Debug, Clone, Copy)]
pub enum TabsEvent {
    Activated(Tab),
}

impl View for TabsView {
    type Event = TabsEvent;

    const REGION: Region = Region::Tabs;

    fn apply(&mut self, event: TabsEvent) {
        match event {
            TabsEvent::Activated(tab) => self.active = tab,
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::from(r#"<nav class="nav">"#);
        for tab in Tab::ALL {
            let active = if tab == self.active { " active" } else { "" };
            let _ = write!(
                out,
                r#"<button class="nav-item{active}" data-tab="{}">{}</button>"#,
                tab.id(),
                escape_html(tab.title(copy))
            );
        }
        out.push_str("</nav>");
        out
    }
}
