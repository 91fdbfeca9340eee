use std::fmt::Write as _;

use shared::{
    domain::{CategoryTaxonomy, REFERENCE_TAXONOMY},
    protocol::{AnnotateRequest, Annotation},
};

use super::{Region, View};
use crate::{copy::UiCopy, error::ValidationError, markup::escape_html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategoryOption {
    pub name: &'static str,
    pub checked: bool,
}

/// Annotation entry form. The sub-category checkboxes are derived from the
/// selected main category and rebuilt from scratch whenever it changes.
#[derive(Debug, Clone)]
pub struct AnnotationFormView {
    taxonomy: CategoryTaxonomy,
    pub text: String,
    /// Empty means nothing selected.
    pub main_category: String,
    pub sub_options: Vec<SubCategoryOption>,
}

impl Default for AnnotationFormView {
    fn default() -> Self {
        Self::new(REFERENCE_TAXONOMY)
    }
}

#[derive(Debug, Clone)]
pub enum AnnotationFormEvent {
    TextChanged(String),
    MainCategorySelected(String),
    SubCategoryToggled { name: String, checked: bool },
    Cleared,
}

impl AnnotationFormView {
    pub fn new(taxonomy: CategoryTaxonomy) -> Self {
        Self {
            taxonomy,
            text: String::new(),
            main_category: String::new(),
            sub_options: Vec::new(),
        }
    }

    pub fn checked_sub_categories(&self) -> Vec<String> {
        self.sub_options
            .iter()
            .filter(|option| option.checked)
            .map(|option| option.name.to_string())
            .collect()
    }

    pub fn is_pristine(&self) -> bool {
        self.text.is_empty() && self.main_category.is_empty() && self.sub_options.is_empty()
    }

    /// Submittable only when text, main category and at least one sub-category are present.
    pub fn to_request(&self) -> Result<AnnotateRequest, ValidationError> {
        let sub_categories = self.checked_sub_categories();
        if self.text.is_empty() || self.main_category.is_empty() || sub_categories.is_empty() {
            return Err(ValidationError::IncompleteAnnotation);
        }
        Ok(AnnotateRequest {
            text: self.text.clone(),
            main_category: self.main_category.clone(),
            sub_categories,
        })
    }
}

impl View for AnnotationFormView {
    type Event = AnnotationFormEvent;

    const REGION: Region = Region::AnnotationForm;

    fn apply(&mut self, event: AnnotationFormEvent) {
        match event {
            AnnotationFormEvent::TextChanged(text) => self.text = text,
            AnnotationFormEvent::MainCategorySelected(main_category) => {
                self.sub_options = self
                    .taxonomy
                    .sub_categories(&main_category)
                    .iter()
                    .map(|&name| SubCategoryOption {
                        name,
                        checked: false,
                    })
                    .collect();
                self.main_category = main_category;
            }
            AnnotationFormEvent::SubCategoryToggled { name, checked } => {
                if let Some(option) = self.sub_options.iter_mut().find(|o| o.name == name) {
                    option.checked = checked;
                }
            }
            AnnotationFormEvent::Cleared => {
                self.text.clear();
                self.main_category.clear();
                self.sub_options.clear();
            }
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<textarea id="annotate-text">{}</textarea><select id="main-category"><option value="">{}</option>"#,
            escape_html(&self.text),
            escape_html(copy.select_main_category),
        );
        for main in self.taxonomy.main_categories() {
            let selected = if main == self.main_category { " selected" } else { "" };
            let main = escape_html(main);
            let _ = write!(out, r#"<option value="{main}"{selected}>{main}</option>"#);
        }
        out.push_str(r#"</select><div id="sub-categories-container">"#);
        for option in &self.sub_options {
            let name = escape_html(option.name);
            let checked = if option.checked { " checked" } else { "" };
            let _ = write!(
                out,
                r#"<div class="checkbox-item"><input type="checkbox" id="sub-{name}" value="{name}"{checked}><label for="sub-{name}">{name}</label></div>"#
            );
        }
        out.push_str("</div>");
        out
    }
}

/// Full annotation list; every load clears and re-renders all rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTableView {
    pub rows: Vec<Annotation>,
}

#[derive(Debug, Clone)]
pub enum AnnotationTableEvent {
    Replaced(Vec<Annotation>),
}

impl View for AnnotationTableView {
    type Event = AnnotationTableEvent;

    const REGION: Region = Region::AnnotationTable;

    fn apply(&mut self, event: AnnotationTableEvent) {
        match event {
            AnnotationTableEvent::Replaced(rows) => self.rows = rows,
        }
    }

    fn render(&self, copy: &UiCopy) -> String {
        let mut out = String::from(r#"<table id="annotations-table"><tbody>"#);
        for row in &self.rows {
            let _ = write!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&row.text),
                escape_html(&row.main_category),
                escape_html(&row.sub_categories.joined(copy.list_separator)),
                escape_html(&copy.format_timestamp(&row.timestamp.0)),
            );
        }
        out.push_str("</tbody></table>");
        out
    }
}
