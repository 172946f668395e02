use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::chat::ChatMessage;
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Transcript<'a> {
    exported_at: String,
    messages: &'a [ChatMessage],
}

/// Writes the conversation as pretty JSON through a temporary file and an
/// atomic rename, off the async runtime.
pub async fn export(path: PathBuf, messages: Vec<ChatMessage>) -> ServiceResult<()> {
    let count = messages.len();
    let target = path.clone();
    tokio::task::spawn_blocking(move || -> ServiceResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let transcript = Transcript {
            exported_at: Utc::now().to_rfc3339(),
            messages: &messages,
        };
        let temp = path.with_extension("tmp");
        let mut f = std::fs::File::create(&temp)?;
        f.write_all(serde_json::to_string_pretty(&transcript)?.as_bytes())?;
        f.sync_all()?;
        std::fs::rename(temp, &path)?;
        Ok(())
    })
    .await
    .map_err(|e| ServiceError::Other(format!("spawn_blocking failed: {e}")))??;

    tracing::info!(path = %target.display(), messages = count, "transcript exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatMessage, TurnStatus};

    #[tokio::test]
    async fn export_writes_messages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("chat.json");
        let mut bot = ChatMessage::bot("done", TurnStatus::Success);
        bot.website_link = Some("https://x-0000000000000.netlify.app".to_string());

        export(path.clone(), vec![ChatMessage::user("todo app"), bot])
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let messages = written["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["text"], "todo app");
        assert_eq!(messages[1]["websiteLink"], "https://x-0000000000000.netlify.app");
        assert!(written["exportedAt"].is_string());
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn export_of_empty_history_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        export(path.clone(), Vec::new()).await.unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["messages"], serde_json::json!([]));
    }
}
