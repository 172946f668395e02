use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::generator::GeneratedTool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Generating,
    Deploying,
    Success,
    Error,
}

impl TurnStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnStatus::Success | TurnStatus::Error)
    }

    /// Badge text shown next to an in-flight or finished bot message.
    pub fn label(&self, provider: &str) -> String {
        match self {
            TurnStatus::Generating => "Generating your tool...".to_string(),
            TurnStatus::Deploying => format!("Deploying to {provider}..."),
            TurnStatus::Success => "Successfully deployed!".to_string(),
            TurnStatus::Error => "Deployment failed".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolDetails {
    pub name: String,
    pub features: Vec<String>,
    #[serde(rename = "techStack")]
    pub tech_stack: Vec<String>,
}

impl From<&GeneratedTool> for ToolDetails {
    fn from(tool: &GeneratedTool) -> Self {
        Self {
            name: tool.name.clone(),
            features: tool.features.clone(),
            tech_stack: tool.tech_stack.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_status: Option<TurnStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_details: Option<ToolDetails>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), None)
    }

    pub fn bot(text: impl Into<String>, status: TurnStatus) -> Self {
        Self::new(Role::Bot, text.into(), Some(status))
    }

    fn new(role: Role, text: String, deployment_status: Option<TurnStatus>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            role,
            text,
            timestamp: Utc::now(),
            deployment_status,
            website_link: None,
            tool_details: None,
        }
    }

    /// `HH:MM` in local time, as shown beside each bubble.
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_unique_ulids() {
        let a = ChatMessage::user("hi");
        let b = ChatMessage::user("hi");
        assert_ne!(a.id, b.id);
        assert!(a.id.parse::<Ulid>().is_ok());
    }

    #[test]
    fn optional_fields_are_skipped_when_absent() {
        let json = serde_json::to_value(ChatMessage::user("hello")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("deploymentStatus").is_none());
        assert!(json.get("websiteLink").is_none());

        let json = serde_json::to_value(ChatMessage::bot("wait", TurnStatus::Generating)).unwrap();
        assert_eq!(json["deploymentStatus"], "generating");
    }

    #[test]
    fn labels_name_the_provider_while_deploying() {
        assert_eq!(TurnStatus::Deploying.label("Netlify"), "Deploying to Netlify...");
        assert_eq!(TurnStatus::Error.label("Netlify"), "Deployment failed");
        assert!(TurnStatus::Success.is_terminal());
        assert!(!TurnStatus::Generating.is_terminal());
    }
}
