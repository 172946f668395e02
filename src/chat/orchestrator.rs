use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::chat::types::{ChatMessage, ToolDetails, TurnStatus};
use crate::deploy::{DeploymentResult, DeploymentSimulator};
use crate::error::{ServiceError, ServiceResult};
use crate::generator::{GeneratedTool, Generator};

const EVENT_CAPACITY: usize = 64;

const GENERATING_TEXT: &str =
    "Analyzing your requirements and generating your productivity tool...";
const GENERATION_FAILED_TEXT: &str = "I apologize, but I encountered an error while generating your productivity tool. Please try again with a different description.";

/// What a finished turn produced. `tool` is `None` when generation failed and
/// `deployment` is `None` when deployment was never attempted.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub message: ChatMessage,
    pub tool: Option<GeneratedTool>,
    pub deployment: Option<DeploymentResult>,
}

impl TurnOutcome {
    pub fn status(&self) -> TurnStatus {
        self.message.deployment_status.unwrap_or(TurnStatus::Error)
    }
}

/// Resets the processing flag however the turn ends.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one conversation: every submission runs
/// `generating → deploying → success | error` on a single bot message.
pub struct Orchestrator {
    generator: Generator,
    deployer: DeploymentSimulator,
    history: Mutex<Vec<ChatMessage>>,
    processing: Arc<AtomicBool>,
    events: broadcast::Sender<ChatMessage>,
}

impl Orchestrator {
    pub fn new(generator: Generator, deployer: DeploymentSimulator) -> Self {
        Self::with_turn_flag(generator, deployer, Arc::new(AtomicBool::new(false)))
    }

    /// Builds an orchestrator whose one-turn-at-a-time rule is shared with
    /// every other orchestrator holding the same `processing` flag.
    pub fn with_turn_flag(
        generator: Generator,
        deployer: DeploymentSimulator,
        processing: Arc<AtomicBool>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            generator,
            deployer,
            history: Mutex::new(Vec::new()),
            processing,
            events,
        }
    }

    /// Receives a snapshot of every appended or updated message.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatMessage> {
        self.events.subscribe()
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.lock_history().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn provider_name(&self) -> &str {
        self.deployer.provider_name()
    }

    pub async fn submit(&self, text: &str) -> ServiceResult<TurnOutcome> {
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyRequest);
        }
        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ServiceError::TurnInProgress);
        }
        let _guard = ProcessingGuard(self.processing.as_ref());

        tracing::info!(request = %text, "turn started");
        self.append(ChatMessage::user(text));
        let bot_id = self
            .append(ChatMessage::bot(GENERATING_TEXT, TurnStatus::Generating))
            .id;

        let tool = match self.generator.generate(text) {
            Ok(tool) => tool,
            Err(err) => {
                tracing::warn!(error = %err, "generation failed");
                let message = self.update(&bot_id, |msg| {
                    msg.text = GENERATION_FAILED_TEXT.to_string();
                    msg.deployment_status = Some(TurnStatus::Error);
                })?;
                return Ok(TurnOutcome {
                    message,
                    tool: None,
                    deployment: None,
                });
            }
        };

        let provider = self.deployer.provider_name().to_string();
        self.update(&bot_id, |msg| {
            msg.text = format!(
                "Great! I've created \"{}\" for you. Now deploying to {provider}...",
                tool.name
            );
            msg.deployment_status = Some(TurnStatus::Deploying);
            msg.tool_details = Some(ToolDetails::from(&tool));
        })?;

        let deployment = self.deployer.deploy_tool(&tool).await;

        let message = if deployment.is_success() {
            self.update(&bot_id, |msg| {
                msg.text = success_text(&tool);
                msg.deployment_status = Some(TurnStatus::Success);
                msg.website_link = Some(deployment.url.clone());
            })?
        } else {
            self.update(&bot_id, |msg| {
                msg.text = format!(
                    "I've generated your productivity tool \"{}\" but encountered an issue during deployment. The tool includes: {}. Please try again for deployment.",
                    tool.name,
                    tool.features.join(", ")
                );
                msg.deployment_status = Some(TurnStatus::Error);
            })?
        };

        tracing::info!(
            tool = %tool.name,
            status = ?message.deployment_status,
            "turn finished"
        );
        Ok(TurnOutcome {
            message,
            tool: Some(tool),
            deployment: Some(deployment),
        })
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, Vec<ChatMessage>> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn append(&self, message: ChatMessage) -> ChatMessage {
        self.lock_history().push(message.clone());
        let _ = self.events.send(message.clone());
        message
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut ChatMessage)) -> ServiceResult<ChatMessage> {
        let snapshot = {
            let mut history = self.lock_history();
            let message = history
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| ServiceError::Other(format!("message {id} is not in history")))?;
            apply(message);
            message.clone()
        };
        let _ = self.events.send(snapshot.clone());
        Ok(snapshot)
    }
}

fn success_text(tool: &GeneratedTool) -> String {
    let features = tool
        .features
        .iter()
        .map(|f| format!("• {f}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Perfect! I've successfully created and deployed \"{}\" for you!\n\n{}\n\nKey Features:\n{}\n\nBuilt with: {}\n\nYour productivity tool is now live and ready to use!",
        tool.name,
        tool.description,
        features,
        tool.tech_stack.join(", ")
    )
}
