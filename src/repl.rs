//! Terminal chat surface
//!
//! Reads one request at a time, renders the bot message's status transitions
//! as they are broadcast, and prints the final result with its link.

use std::path::Path;
use std::sync::Arc;

use colored::{ColoredString, Colorize};
use dialoguer::{Confirm, Input};

use crate::catalog::Catalog;
use crate::chat::{ChatMessage, Orchestrator, Role, TurnStatus};
use crate::config::Settings;
use crate::error::{ServiceError, ServiceResult};
use crate::metadata;

const EXAMPLES: &[&str] = &[
    "A habit tracker with streak counters",
    "Task manager with drag and drop",
    "Pomodoro timer with statistics",
    "Note-taking app with categories",
];

fn dialog_err(err: dialoguer::Error) -> ServiceError {
    ServiceError::Other(format!("prompt failed: {err}"))
}

pub fn badge(status: TurnStatus, provider: &str) -> ColoredString {
    let label = format!("[{}]", status.label(provider));
    match status {
        TurnStatus::Generating => label.blue(),
        TurnStatus::Deploying => label.yellow(),
        TurnStatus::Success => label.green().bold(),
        TurnStatus::Error => label.red().bold(),
    }
}

fn render_progress(message: &ChatMessage, provider: &str) {
    let Some(status) = message.deployment_status else {
        return;
    };
    if message.role != Role::Bot || status.is_terminal() {
        return;
    }
    println!("{} {}", badge(status, provider), message.text.dimmed());
    if let Some(details) = &message.tool_details {
        println!("  {}", "Features:".bold());
        for feature in &details.features {
            println!("    • {feature}");
        }
        println!("  {} {}", "Tech stack:".bold(), details.tech_stack.join(", "));
    }
}

pub fn render_final(message: &ChatMessage, provider: &str) {
    if let Some(status) = message.deployment_status {
        println!("{} {}", badge(status, provider), message.time_label().dimmed());
    }
    println!("{}", message.text);
    if let Some(link) = &message.website_link {
        println!("\n  {} {}", "Live at".bold(), link.cyan().underline());
    }
    println!();
}

pub fn print_templates(catalog: &Catalog) {
    for summary in catalog.summaries() {
        println!(
            "{} {}",
            format!("#{}", summary.index).dimmed(),
            summary.name.bold()
        );
        println!("   {}", summary.description);
        println!("   features: {}", summary.features.join(", "));
        println!("   stack:    {}", summary.tech_stack.join(", "));
        println!("   keywords: {}", summary.keywords.join(", ").italic());
    }
}

fn greet() {
    println!("{}", metadata::banner().bold());
    println!("Describe your productivity tool idea and I'll build and deploy it for you.");
    println!("Try one of:");
    for example in EXAMPLES {
        println!("  • \"{example}\"");
    }
    println!("{}\n", "Type /history to review the chat, /quit to leave.".dimmed());
}

async fn prompt() -> ServiceResult<String> {
    tokio::task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()
            .map_err(dialog_err)
    })
    .await
    .map_err(|e| ServiceError::Other(format!("prompt task failed: {e}")))?
}

/// Runs one turn, printing transitions while the deployment is pending.
pub async fn run_turn(orchestrator: &Orchestrator, request: &str) -> ServiceResult<ChatMessage> {
    let provider = orchestrator.provider_name().to_string();
    let mut events = orchestrator.subscribe();
    let turn = orchestrator.submit(request);
    tokio::pin!(turn);

    let outcome = loop {
        tokio::select! {
            result = &mut turn => break result?,
            Ok(message) = events.recv() => render_progress(&message, &provider),
        }
    };
    while let Ok(message) = events.try_recv() {
        render_progress(&message, &provider);
    }

    render_final(&outcome.message, &provider);
    Ok(outcome.message)
}

pub async fn run(orchestrator: Arc<Orchestrator>) -> ServiceResult<()> {
    greet();
    loop {
        let line = prompt().await?;
        let request = line.trim();
        match request {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                for message in orchestrator.history() {
                    let who = match message.role {
                        Role::User => "you".cyan(),
                        Role::Bot => "bot".magenta(),
                    };
                    let first_line = message.text.lines().next().unwrap_or_default();
                    println!("{} {} {}", message.time_label().dimmed(), who, first_line);
                }
                println!();
            }
            _ => {
                if let Err(err) = run_turn(&orchestrator, &line).await {
                    println!("{}", err.to_string().red());
                }
            }
        }
    }
    Ok(())
}

/// Interactive settings editor; writes `path` when confirmed.
pub fn edit_settings(path: &Path) -> ServiceResult<Settings> {
    let current = Settings::load(path)?;
    println!("Editing {}", path.display().to_string().bold());

    let edited = Settings {
        provider_name: Input::new()
            .with_prompt("Provider name")
            .default(current.provider_name.clone())
            .interact_text()
            .map_err(dialog_err)?,
        domain: Input::new()
            .with_prompt("Hosting domain")
            .default(current.domain.clone())
            .interact_text()
            .map_err(dialog_err)?,
        min_delay_ms: Input::new()
            .with_prompt("Minimum deploy delay (ms)")
            .default(current.min_delay_ms)
            .interact_text()
            .map_err(dialog_err)?,
        max_delay_ms: Input::new()
            .with_prompt("Maximum deploy delay (ms)")
            .default(current.max_delay_ms)
            .interact_text()
            .map_err(dialog_err)?,
        failure_rate: Input::new()
            .with_prompt("Failure rate (0-1)")
            .default(current.failure_rate)
            .interact_text()
            .map_err(dialog_err)?,
        status_poll_ms: Input::new()
            .with_prompt("Status poll interval (ms)")
            .default(current.status_poll_ms)
            .interact_text()
            .map_err(dialog_err)?,
    };

    if let Err(err) = edited.validate() {
        println!("{}", err.to_string().red());
        return Ok(current);
    }

    let save = Confirm::new()
        .with_prompt("Save settings?")
        .default(true)
        .interact()
        .map_err(dialog_err)?;
    if save {
        edited.save(path)?;
        println!("{}", "Saved.".green());
        Ok(edited)
    } else {
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::deploy::{DeploymentSimulator, SeededEntropy};
    use crate::generator::Generator;

    #[test]
    fn badges_use_status_labels() {
        colored::control::set_override(false);
        assert_eq!(badge(TurnStatus::Deploying, "Netlify").to_string(), "[Deploying to Netlify...]");
        assert_eq!(badge(TurnStatus::Success, "Netlify").to_string(), "[Successfully deployed!]");
    }

    #[tokio::test(start_paused = true)]
    async fn run_turn_returns_terminal_message() {
        let orchestrator = Orchestrator::new(
            Generator::new(Arc::new(Catalog::builtin())),
            DeploymentSimulator::new(&Settings::default(), Arc::new(SeededEntropy::new(11))),
        );
        let started = tokio::time::Instant::now();
        let message = run_turn(&orchestrator, "project board for my team").await.unwrap();

        assert_eq!(message.deployment_status, Some(TurnStatus::Success));
        assert!(message.website_link.unwrap().starts_with("https://project-task-manager-pro-"));
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
