//! Configuration for copysentry.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (COPYSENTRY_HOME, COPYSENTRY_STORE, COPYSENTRY_API_KEY)
//! 2. Config file (.copysentry/config.yaml)
//! 3. Defaults (~/.copysentry)
//!
//! Config file discovery:
//! - Searches current directory and parents for .copysentry/config.yaml
//! - Paths in config file are relative to the config file's parent directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// What the classifier does when the model errors or returns garbage.
///
/// Fail-open keeps uncertain items for human review; fail-closed drops
/// them. Fail-open is the product default and must stay an explicit,
/// testable policy rather than an implicit constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    FailOpen,
    FailClosed,
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub gateway: Option<GatewayConfig>,
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
    #[serde(default)]
    pub capture: Option<CaptureConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Engine state directory (relative to config file)
    pub home: Option<String>,
    /// Snapshot store directory (relative to config file)
    pub store: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub min_confidence: Option<f64>,
    pub batch_size: Option<usize>,
    pub batch_delay_ms: Option<u64>,
    pub failure_policy: Option<FailurePolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    pub fetch_timeout_seconds: Option<u64>,
    pub max_text_chars: Option<usize>,
    pub max_links: Option<usize>,
}

/// Resolved configuration with absolute paths and filled-in defaults
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to copysentry home (engine state)
    pub home: PathBuf,
    /// Absolute path to the snapshot store root
    pub store: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Gateway endpoint/model selection
    pub gateway: GatewaySettings,
    /// Classifier thresholds and policy
    pub classifier: ClassifierSettings,
    /// Capture limits
    pub capture: CaptureSettings,
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub endpoint: Option<String>,
    pub model: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Promotion threshold for batch classification
    pub min_confidence: f64,
    /// Candidates dispatched concurrently per group
    pub batch_size: usize,
    /// Delay between groups, a coarse throttle for upstream rate limits
    pub batch_delay: Duration,
    /// Error-degradation policy
    pub failure_policy: FailurePolicy,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_confidence: 0.75,
            batch_size: 5,
            batch_delay: Duration::from_millis(1000),
            failure_policy: FailurePolicy::FailOpen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub fetch_timeout: Duration,
    pub max_text_chars: usize,
    pub max_links: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            max_text_chars: 50_000,
            max_links: 500,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".copysentry").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".copysentry");

    let config_file = find_config_file();

    let file = match config_file {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    // Base directory for relative paths is the parent of .copysentry/
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let home = if let Ok(env_home) = std::env::var("COPYSENTRY_HOME") {
        PathBuf::from(env_home)
    } else if let Some(home_path) = file.as_ref().and_then(|f| f.paths.home.as_deref()) {
        resolve_path(&base_dir, home_path)
    } else {
        default_home
    };

    let store = if let Ok(env_store) = std::env::var("COPYSENTRY_STORE") {
        PathBuf::from(env_store)
    } else if let Some(store_path) = file.as_ref().and_then(|f| f.paths.store.as_deref()) {
        resolve_path(&base_dir, store_path)
    } else {
        home.join("snapshots")
    };

    let gateway = GatewaySettings {
        endpoint: file
            .as_ref()
            .and_then(|f| f.gateway.as_ref())
            .and_then(|g| g.endpoint.clone()),
        model: file
            .as_ref()
            .and_then(|f| f.gateway.as_ref())
            .and_then(|g| g.model.clone())
            .unwrap_or_else(|| GatewaySettings::default().model),
    };

    let defaults = ClassifierSettings::default();
    let classifier_file = file.as_ref().and_then(|f| f.classifier.as_ref());
    let classifier = ClassifierSettings {
        min_confidence: classifier_file
            .and_then(|c| c.min_confidence)
            .unwrap_or(defaults.min_confidence),
        batch_size: classifier_file
            .and_then(|c| c.batch_size)
            .unwrap_or(defaults.batch_size),
        batch_delay: classifier_file
            .and_then(|c| c.batch_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.batch_delay),
        failure_policy: classifier_file
            .and_then(|c| c.failure_policy)
            .unwrap_or(defaults.failure_policy),
    };

    let capture_defaults = CaptureSettings::default();
    let capture_file = file.as_ref().and_then(|f| f.capture.as_ref());
    let capture = CaptureSettings {
        fetch_timeout: capture_file
            .and_then(|c| c.fetch_timeout_seconds)
            .map(Duration::from_secs)
            .unwrap_or(capture_defaults.fetch_timeout),
        max_text_chars: capture_file
            .and_then(|c| c.max_text_chars)
            .unwrap_or(capture_defaults.max_text_chars),
        max_links: capture_file
            .and_then(|c| c.max_links)
            .unwrap_or(capture_defaults.max_links),
    };

    Ok(ResolvedConfig {
        home,
        store,
        config_file,
        gateway,
        classifier,
        capture,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// API key for the LLM gateway, from the environment only.
///
/// Never read from the config file so a committed config can't leak it.
pub fn api_key() -> Result<String> {
    std::env::var("COPYSENTRY_API_KEY")
        .context("COPYSENTRY_API_KEY environment variable is not set")
}
