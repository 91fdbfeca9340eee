use serde::{Deserialize, Serialize};

/// Static mapping from main category to its allowed sub-categories, in display order.
#[derive(Debug, Clone, Copy)]
pub struct CategoryTaxonomy {
    entries: &'static [(&'static str, &'static [&'static str])],
}

pub const REFERENCE_TAXONOMY: CategoryTaxonomy = CategoryTaxonomy {
    entries: &[
        (
            "正向价值观",
            &["爱国", "敬业", "诚信", "友善", "和谐", "公平", "正义"],
        ),
        (
            "负向价值观",
            &["暴力", "歧视", "谣言", "极端", "违法", "不当言论"],
        ),
        ("中性", &["客观描述", "日常交流"]),
    ],
};

impl CategoryTaxonomy {
    pub const fn new(entries: &'static [(&'static str, &'static [&'static str])]) -> Self {
        Self { entries }
    }

    pub fn main_categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(main, _)| *main)
    }

    /// Unknown or empty main categories yield an empty slice.
    pub fn sub_categories(&self, main_category: &str) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(main, _)| *main == main_category)
            .map(|(_, subs)| *subs)
            .unwrap_or(&[])
    }

    pub fn contains(&self, main_category: &str) -> bool {
        self.entries.iter().any(|(main, _)| *main == main_category)
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        REFERENCE_TAXONOMY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}
