//! Template catalog
//!
//! An ordered, read-only list of fully authored tool templates. Templates are
//! identified by their position; the first entry doubles as the fallback when
//! no keyword matches a request.

mod builtin;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use builtin::{HABIT_TRACKER, TASK_MANAGER};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolTemplate {
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    #[serde(rename = "techStack")]
    pub tech_stack: Vec<String>,
    /// Lower-case fragments that route a request to this template.
    pub keywords: Vec<String>,
    #[serde(rename = "htmlCode")]
    pub html: String,
    #[serde(rename = "cssCode")]
    pub css: String,
    #[serde(rename = "jsCode")]
    pub js: String,
}

impl ToolTemplate {
    /// True when any of this template's keywords occurs in `lowered`.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Short listing entry, without the source payloads.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct TemplateSummary {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    #[serde(rename = "techStack")]
    pub tech_stack: Vec<String>,
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    templates: Vec<ToolTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<ToolTemplate>) -> Self {
        Self { templates }
    }

    /// Task manager first, habit tracker second.
    pub fn builtin() -> Self {
        Self::new(vec![builtin::task_manager(), builtin::habit_tracker()])
    }

    pub fn get(&self, index: usize) -> Option<&ToolTemplate> {
        self.templates.get(index)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolTemplate> {
        self.templates.iter()
    }

    /// Index of the first template whose keywords match, scanning in catalog
    /// order. `None` when nothing matches.
    pub fn first_match(&self, lowered: &str) -> Option<usize> {
        self.templates.iter().position(|t| t.matches(lowered))
    }

    pub fn summaries(&self) -> Vec<TemplateSummary> {
        self.templates
            .iter()
            .enumerate()
            .map(|(index, t)| TemplateSummary {
                index,
                name: t.name.clone(),
                description: t.description.clone(),
                features: t.features.clone(),
                tech_stack: t.tech_stack.clone(),
                keywords: t.keywords.clone(),
            })
            .collect()
    }
}
