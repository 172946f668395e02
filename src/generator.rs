use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, TASK_MANAGER, ToolTemplate};
use crate::error::{ServiceError, ServiceResult};

/// Bonus features appended during customization, checked in this order.
const BONUS_FEATURES: &[(&[&str], &str)] = &[
    (&["team", "collaboration"], "Team Collaboration"),
    (&["notification", "reminder"], "Smart Notifications"),
    (&["analytics", "report"], "Analytics Dashboard"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedTool {
    pub name: String,
    pub description: String,
    pub features: Vec<String>,
    #[serde(rename = "techStack")]
    pub tech_stack: Vec<String>,
    #[serde(rename = "htmlCode")]
    pub html: String,
    #[serde(rename = "cssCode")]
    pub css: String,
    #[serde(rename = "jsCode")]
    pub js: String,
    #[serde(rename = "templateIndex")]
    pub template_index: usize,
}

/// Maps free-text requests onto catalog templates.
#[derive(Clone, Debug)]
pub struct Generator {
    catalog: Arc<Catalog>,
}

impl Generator {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn generate(&self, request: &str) -> ServiceResult<GeneratedTool> {
        let index = self.select(request)?;
        let template = self
            .catalog
            .get(index)
            .ok_or_else(|| ServiceError::Generation(format!("no template at index {index}")))?;
        let tool = customize(template, index, request);
        tracing::debug!(
            template = %template.name,
            name = %tool.name,
            features = tool.features.len(),
            "generated tool"
        );
        Ok(tool)
    }

    /// First template whose keywords appear in the lower-cased request,
    /// falling back to the task manager slot.
    pub fn select(&self, request: &str) -> ServiceResult<usize> {
        if self.catalog.is_empty() {
            return Err(ServiceError::Generation("template catalog is empty".to_string()));
        }
        let lowered = request.to_lowercase();
        Ok(self.catalog.first_match(&lowered).unwrap_or(TASK_MANAGER))
    }
}

pub fn customize(template: &ToolTemplate, template_index: usize, request: &str) -> GeneratedTool {
    let name = match request.split_whitespace().next() {
        Some(word) => format!("{} {}", capitalize(word), template.name),
        None => template.name.clone(),
    };

    let lowered = request.to_lowercase();
    let mut features = template.features.clone();
    for (triggers, feature) in BONUS_FEATURES {
        if triggers.iter().any(|t| lowered.contains(t)) {
            features.push(feature.to_string());
        }
    }

    GeneratedTool {
        name,
        description: template.description.clone(),
        features,
        tech_stack: template.tech_stack.clone(),
        html: template.html.clone(),
        css: template.css.clone(),
        js: template.js.clone(),
        template_index,
    }
}

/// Upper-cases the first character only; the rest is left untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
