use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use rmcp::{
    ErrorData, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::chat::Orchestrator;
use crate::deploy::DeploymentSimulator;
use crate::generator::{GeneratedTool, Generator};

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct GenerateArgs {
    /// Free-text description of the desired tool
    pub request: String,
    /// Include the HTML, CSS and JS bodies in the response
    #[serde(rename = "includeSource", default)]
    pub include_source: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct DeployArgs {
    #[serde(rename = "siteName")]
    pub site_name: String,
    #[serde(rename = "htmlCode", default)]
    pub html: String,
    #[serde(rename = "cssCode", default)]
    pub css: String,
    #[serde(rename = "jsCode", default)]
    pub js: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct CheckDeploymentArgs {
    #[serde(rename = "deploymentId")]
    pub deployment_id: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct BuildArgs {
    pub request: String,
}

/// Drops the source payloads unless the caller asked for them.
pub fn tool_to_json(tool: &GeneratedTool, include_source: bool) -> Value {
    let mut value = json!(tool);
    if !include_source {
        if let Some(map) = value.as_object_mut() {
            for key in ["htmlCode", "cssCode", "jsCode"] {
                map.remove(key);
            }
        }
    }
    value
}

#[derive(Clone)]
pub struct ToolGeneratorServer {
    generator: Generator,
    deployer: DeploymentSimulator,
    /// Held by whichever `build_tool` turn is running.
    turn_flag: Arc<AtomicBool>,
    tool_router: ToolRouter<ToolGeneratorServer>,
}

#[tool_router]
impl ToolGeneratorServer {
    pub fn new(generator: Generator, deployer: DeploymentSimulator) -> Self {
        Self {
            generator,
            deployer,
            turn_flag: Arc::new(AtomicBool::new(false)),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List the available productivity tool templates")]
    async fn list_templates(&self) -> Result<CallToolResult, ErrorData> {
        let templates = self.generator.catalog().summaries();
        Ok(CallToolResult::structured(json!({ "templates": templates })))
    }

    #[tool(description = "Generate a productivity tool from a natural-language description")]
    async fn generate_tool(
        &self,
        Parameters(args): Parameters<GenerateArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let tool = self.generator.generate(&args.request)?;
        Ok(CallToolResult::structured(tool_to_json(
            &tool,
            args.include_source,
        )))
    }

    #[tool(description = "Deploy generated source to the simulated hosting provider")]
    async fn deploy_tool(
        &self,
        Parameters(args): Parameters<DeployArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self
            .deployer
            .deploy(&args.html, &args.css, &args.js, &args.site_name)
            .await;
        Ok(CallToolResult::structured(json!(result)))
    }

    #[tool(description = "Check the status of a simulated deployment")]
    async fn check_deployment(
        &self,
        Parameters(args): Parameters<CheckDeploymentArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let status = self.deployer.check_status(&args.deployment_id).await;
        Ok(CallToolResult::structured(json!({
            "deploymentId": args.deployment_id,
            "status": status
        })))
    }

    #[tool(description = "Generate and deploy a tool in one chat turn")]
    async fn build_tool(
        &self,
        Parameters(args): Parameters<BuildArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        // each call is its own conversation; only the turn flag outlives it
        let orchestrator = Orchestrator::with_turn_flag(
            self.generator.clone(),
            self.deployer.clone(),
            self.turn_flag.clone(),
        );
        let outcome = orchestrator.submit(&args.request).await?;
        Ok(CallToolResult::structured(json!({
            "message": outcome.message,
            "deployment": outcome.deployment,
        })))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for ToolGeneratorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "Describe a productivity tool to generate_tool or build_tool; deployments go to {} (simulated)",
                self.deployer.provider_name()
            )),
            ..Default::default()
        }
    }
}

/// Serves the tool set over stdio until the client disconnects.
pub async fn run(server: ToolGeneratorServer) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("serving MCP tools over stdio");
    let running = server.serve(stdio()).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "MCP session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Settings;
    use crate::deploy::SeededEntropy;

    fn server() -> ToolGeneratorServer {
        ToolGeneratorServer::new(
            Generator::new(Arc::new(Catalog::builtin())),
            DeploymentSimulator::new(&Settings::default(), Arc::new(SeededEntropy::new(21))),
        )
    }

    fn structured(result: CallToolResult) -> Value {
        result.structured_content.expect("structured result")
    }

    #[test]
    fn tool_json_hides_source_by_default() {
        let generator = Generator::new(Arc::new(Catalog::builtin()));
        let tool = generator.generate("daily habit list").unwrap();

        let slim = tool_to_json(&tool, false);
        assert_eq!(slim["name"], "Daily Habit Tracker");
        assert!(slim.get("htmlCode").is_none());
        assert!(slim.get("jsCode").is_none());

        let full = tool_to_json(&tool, true);
        assert!(full["htmlCode"].as_str().unwrap().contains("<!DOCTYPE html>"));
    }

    #[test]
    fn server_info_mentions_provider() {
        let settings = Settings::default();
        let server = ToolGeneratorServer::new(
            Generator::new(Arc::new(Catalog::builtin())),
            DeploymentSimulator::new(&settings, Arc::new(SeededEntropy::new(1))),
        );
        let info = rmcp::ServerHandler::get_info(&server);
        assert!(info.instructions.unwrap().contains("Netlify"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn deploy_args_accept_camel_case_payloads() {
        let args: DeployArgs = serde_json::from_value(json!({
            "siteName": "My Tool",
            "htmlCode": "<p>hi</p>"
        }))
        .unwrap();
        assert_eq!(args.site_name, "My Tool");
        assert!(args.css.is_empty());
    }

    #[tokio::test]
    async fn generate_tool_returns_customized_tool() {
        let result = server()
            .generate_tool(Parameters(GenerateArgs {
                request: "team task board with analytics".to_string(),
                include_source: false,
            }))
            .await
            .unwrap();
        let tool = structured(result);
        assert_eq!(tool["name"], "Team Task Manager Pro");
        assert_eq!(tool["features"].as_array().unwrap().len(), 6);
        assert!(tool.get("htmlCode").is_none());
    }

    #[tokio::test]
    async fn list_templates_reports_builtin_catalog() {
        let listing = structured(server().list_templates().await.unwrap());
        let templates = listing["templates"].as_array().unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[1]["name"], "Habit Tracker");
    }

    #[tokio::test(start_paused = true)]
    async fn deploy_then_check_deployment() {
        let server = server();
        let deployed = structured(
            server
                .deploy_tool(Parameters(DeployArgs {
                    site_name: String::new(),
                    html: "<p>hi</p>".to_string(),
                    css: String::new(),
                    js: String::new(),
                }))
                .await
                .unwrap(),
        );
        assert_eq!(deployed["status"], "success");
        assert!(deployed["url"].as_str().unwrap().starts_with("https://site-"));

        let id = deployed["deploymentId"].as_str().unwrap().to_string();
        let status = structured(
            server
                .check_deployment(Parameters(CheckDeploymentArgs { deployment_id: id.clone() }))
                .await
                .unwrap(),
        );
        assert_eq!(status["deploymentId"], id.as_str());
        assert_eq!(status["status"], "success");

        let unknown = structured(
            server
                .check_deployment(Parameters(CheckDeploymentArgs {
                    deployment_id: "nope".to_string(),
                }))
                .await
                .unwrap(),
        );
        assert_eq!(unknown["status"], "error");
    }

    #[tokio::test]
    async fn blank_build_request_is_invalid_params() {
        let err = server()
            .build_tool(Parameters(BuildArgs {
                request: "   ".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "Request text is empty");
    }

    #[tokio::test(start_paused = true)]
    async fn build_tool_runs_each_turn_as_its_own_conversation() {
        let server = server();
        for request in ["daily routine", "todo list"] {
            let built = structured(
                server
                    .build_tool(Parameters(BuildArgs {
                        request: request.to_string(),
                    }))
                    .await
                    .unwrap(),
            );
            assert_eq!(built["message"]["role"], "bot");
            assert_eq!(built["message"]["deploymentStatus"], "success");
            assert_eq!(built["deployment"]["status"], "success");
        }
        assert!(!server.turn_flag.load(Ordering::Acquire));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_build_is_rejected() {
        let server = server();
        let first = {
            let server = server.clone();
            tokio::spawn(async move {
                server
                    .build_tool(Parameters(BuildArgs {
                        request: "project tracker".to_string(),
                    }))
                    .await
            })
        };
        while !server.turn_flag.load(Ordering::Acquire) {
            tokio::task::yield_now().await;
        }

        let err = server
            .build_tool(Parameters(BuildArgs {
                request: "habit tracker".to_string(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.message, "A turn is already in progress");

        assert!(first.await.unwrap().is_ok());
        assert!(!server.turn_flag.load(Ordering::Acquire));
    }
}
