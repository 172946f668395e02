//! Simulated deployment
//!
//! Nothing leaves the process: the simulator waits a randomized interval and
//! hands back a plausible URL on the configured hosting domain. Randomness is
//! injected through [`Entropy`] so tests can pin ids, delays and failures.

use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::generator::GeneratedTool;

pub const DEPLOYMENT_ID_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Slug used when the site name has no characters left to build one from.
const FALLBACK_SLUG: &str = "site";

static UNSAFE_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]").expect("static regex"));
static DEPLOYMENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-z]{13}$").expect("static regex"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeploymentResult {
    pub url: String,
    #[serde(rename = "deploymentId")]
    pub deployment_id: String,
    pub status: DeploymentStatus,
    pub message: String,
}

impl DeploymentResult {
    pub fn is_success(&self) -> bool {
        self.status == DeploymentStatus::Success
    }

    fn failed() -> Self {
        Self {
            url: String::new(),
            deployment_id: String::new(),
            status: DeploymentStatus::Error,
            message: "Deployment failed. Please try again.".to_string(),
        }
    }
}

/// Source of every random decision the simulator makes.
pub trait Entropy: Send + Sync {
    /// A 13 character base-36 token.
    fn deployment_id(&self) -> String;
    /// A duration in `[min, max)`; `min` when the range is empty.
    fn delay(&self, min: Duration, max: Duration) -> Duration;
    /// True with probability `rate`.
    fn fails(&self, rate: f64) -> bool;
}

fn token_from<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..DEPLOYMENT_ID_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn delay_from<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    let (lo, hi) = (min.as_millis() as u64, max.as_millis() as u64);
    if lo >= hi {
        return min;
    }
    Duration::from_millis(rng.gen_range(lo..hi))
}

/// Thread-local RNG; the production default.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadEntropy;

impl Entropy for ThreadEntropy {
    fn deployment_id(&self) -> String {
        token_from(&mut rand::thread_rng())
    }

    fn delay(&self, min: Duration, max: Duration) -> Duration {
        delay_from(&mut rand::thread_rng(), min, max)
    }

    fn fails(&self, rate: f64) -> bool {
        rand::thread_rng().gen_bool(rate.clamp(0.0, 1.0))
    }
}

/// Reproducible entropy for tests and demos.
#[derive(Debug)]
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}

impl Entropy for SeededEntropy {
    fn deployment_id(&self) -> String {
        self.with_rng(|rng| token_from(rng))
    }

    fn delay(&self, min: Duration, max: Duration) -> Duration {
        self.with_rng(|rng| delay_from(rng, min, max))
    }

    fn fails(&self, rate: f64) -> bool {
        self.with_rng(|rng| rng.gen_bool(rate.clamp(0.0, 1.0)))
    }
}

/// Lower-cases `name` and replaces anything outside `[a-z0-9-]` with `-`.
pub fn sanitize_site_name(name: &str) -> String {
    UNSAFE_SLUG_CHARS
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

pub fn is_deployment_id(candidate: &str) -> bool {
    DEPLOYMENT_ID_RE.is_match(candidate)
}

#[derive(Clone)]
pub struct DeploymentSimulator {
    provider_name: String,
    domain: String,
    min_delay: Duration,
    max_delay: Duration,
    failure_rate: f64,
    status_poll: Duration,
    entropy: Arc<dyn Entropy>,
}

impl DeploymentSimulator {
    pub fn new(settings: &Settings, entropy: Arc<dyn Entropy>) -> Self {
        Self {
            provider_name: settings.provider_name.clone(),
            domain: settings.domain.clone(),
            min_delay: settings.min_delay(),
            max_delay: settings.max_delay(),
            failure_rate: settings.failure_rate,
            status_poll: settings.status_poll(),
            entropy,
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    /// Waits out the simulated build and returns the fabricated site.
    ///
    /// The three source bodies are only measured for logging.
    pub async fn deploy(&self, html: &str, css: &str, js: &str, site_name: &str) -> DeploymentResult {
        let deployment_id = self.entropy.deployment_id();
        let slug = match sanitize_site_name(site_name) {
            slug if slug.is_empty() => FALLBACK_SLUG.to_string(),
            slug => slug,
        };
        let wait = self.entropy.delay(self.min_delay, self.max_delay);
        tracing::debug!(
            %slug,
            %deployment_id,
            html_bytes = html.len(),
            css_bytes = css.len(),
            js_bytes = js.len(),
            wait_ms = wait.as_millis() as u64,
            "starting simulated deployment"
        );

        tokio::time::sleep(wait).await;

        if self.failure_rate > 0.0 && self.entropy.fails(self.failure_rate) {
            tracing::warn!(%slug, %deployment_id, "injected deployment failure");
            return DeploymentResult::failed();
        }

        let url = format!("https://{slug}-{deployment_id}.{}", self.domain);
        tracing::info!(%url, "deployment finished");
        DeploymentResult {
            url,
            deployment_id,
            status: DeploymentStatus::Success,
            message: format!("Successfully deployed to {}!", self.provider_name),
        }
    }

    pub async fn deploy_tool(&self, tool: &GeneratedTool) -> DeploymentResult {
        self.deploy(&tool.html, &tool.css, &tool.js, &tool.name).await
    }

    /// Simulated status poll: well-formed ids report success.
    pub async fn check_status(&self, deployment_id: &str) -> DeploymentStatus {
        tokio::time::sleep(self.status_poll).await;
        if is_deployment_id(deployment_id) {
            DeploymentStatus::Success
        } else {
            DeploymentStatus::Error
        }
    }
}
