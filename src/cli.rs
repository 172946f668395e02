use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Settings;
use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to <config dir>/toolipro/settings.json)
    #[arg(long, global = true, env = "TOOLIPRO_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Chat interactively: describe a tool, watch it generate and deploy
    Chat(ChatArgs),
    /// Generate a tool from a description and print it as JSON
    Generate(GenerateArgs),
    /// Run one full generate-and-deploy turn
    Build(BuildArgs),
    /// List the built-in templates
    Templates,
    /// Serve the generator as MCP tools over stdio
    Serve,
    /// Open an interactive editor for settings.json
    Config,
    /// Print version information
    Version,
}

impl Command {
    /// Default log directive when RUST_LOG is unset.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Command::Serve => "info",
            _ => "warn",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Write the conversation as JSON when the session ends
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Description of the tool, e.g. "team task board with analytics"
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub request: Vec<String>,

    /// Include the generated HTML, CSS and JS in the output
    #[arg(long, default_value_t = false)]
    pub with_source: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub request: Vec<String>,

    /// Write the resulting turn as JSON
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

/// Per-run overrides layered over settings.json.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Hosting domain used in fabricated URLs
    #[arg(long, global = true, env = "TOOLIPRO_DOMAIN")]
    pub domain: Option<String>,

    #[arg(long, global = true, env = "TOOLIPRO_MIN_DELAY_MS")]
    pub min_delay_ms: Option<u64>,

    #[arg(long, global = true, env = "TOOLIPRO_MAX_DELAY_MS")]
    pub max_delay_ms: Option<u64>,

    /// Probability in [0, 1] that a simulated deployment fails
    #[arg(long, global = true, env = "TOOLIPRO_FAILURE_RATE")]
    pub failure_rate: Option<f64>,

    /// Seed the deployment RNG for reproducible ids and delays
    #[arg(long, global = true, env = "TOOLIPRO_SEED")]
    pub seed: Option<u64>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(domain) = &self.domain {
            settings.domain = domain.clone();
        }
        if let Some(ms) = self.min_delay_ms {
            settings.min_delay_ms = ms;
        }
        if let Some(ms) = self.max_delay_ms {
            settings.max_delay_ms = ms;
        }
        if let Some(rate) = self.failure_rate {
            settings.failure_rate = rate;
        }
    }
}

pub fn join_request(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_free_text() {
        let cli = Cli::try_parse_from([
            "toolipro",
            "generate",
            "--with-source",
            "team",
            "task",
            "board",
        ])
        .unwrap();
        match cli.command {
            Command::Generate(args) => {
                assert!(args.with_source);
                assert_eq!(join_request(&args.request), "team task board");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_overrides_apply_to_settings() {
        let cli = Cli::try_parse_from([
            "toolipro",
            "--domain",
            "pages.dev",
            "--failure-rate",
            "0.5",
            "build",
            "habit",
        ])
        .unwrap();
        let mut settings = Settings::default();
        cli.overrides.apply(&mut settings);
        assert_eq!(settings.domain, "pages.dev");
        assert_eq!(settings.failure_rate, 0.5);
        assert_eq!(settings.min_delay_ms, 2000);
    }

    #[test]
    fn serve_logs_at_info_by_default() {
        assert_eq!(Command::Serve.default_log_level(), "info");
        assert_eq!(Command::Templates.default_log_level(), "warn");
    }
}
