// Runtime configuration for execution contexts
use crate::engine::{ContextCommand, HARNESS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/runtime.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub name: String,
    pub version: String,
    /// Interpreter binary, looked up on `PATH`
    pub command: String,
    /// Extra interpreter flags, placed before the harness
    #[serde(default)]
    pub args: Vec<String>,
    pub memory_limit_mb: u32,
    pub default_timeout_ms: u64,
    pub max_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuntimeJson {
    runtime: RuntimeConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: "node".to_string(),
            version: "20".to_string(),
            command: "node".to_string(),
            args: Vec::new(),
            memory_limit_mb: 128,
            default_timeout_ms: codelab_common::types::DEFAULT_TIMEOUT_MS,
            max_timeout_ms: 30_000,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from runtime.json
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Runtime config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path).context("Failed to read runtime.json")?;

        let runtime_json: RuntimeJson =
            serde_json::from_str(&content).context("Failed to parse runtime.json")?;

        let config = runtime_json.runtime;
        config.validate()?;
        Ok(config)
    }

    /// Load with default path (config/runtime.json)
    pub fn load_default() -> Result<Self> {
        Self::load(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load `path` if it exists, built-in defaults otherwise
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `CODELAB_RUNTIME_COMMAND` and `CODELAB_MEMORY_LIMIT_MB`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(command) = std::env::var("CODELAB_RUNTIME_COMMAND") {
            self.command = command;
        }
        if let Ok(limit) = std::env::var("CODELAB_MEMORY_LIMIT_MB") {
            self.memory_limit_mb = limit
                .parse()
                .with_context(|| format!("Invalid CODELAB_MEMORY_LIMIT_MB: {limit}"))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            bail!("Runtime command must not be empty");
        }
        if self.memory_limit_mb == 0 {
            bail!("memory_limit_mb must be positive");
        }
        if self.default_timeout_ms == 0 || self.max_timeout_ms == 0 {
            bail!("Timeouts must be positive");
        }
        if self.default_timeout_ms > self.max_timeout_ms {
            bail!(
                "default_timeout_ms ({}) exceeds max_timeout_ms ({})",
                self.default_timeout_ms,
                self.max_timeout_ms
            );
        }
        Ok(())
    }

    /// Command line that starts one context running the harness
    pub fn context_command(&self) -> ContextCommand {
        let mut args = self.args.clone();
        args.push(format!("--max-old-space-size={}", self.memory_limit_mb));
        args.push("--eval".to_string());
        args.push(HARNESS.to_string());
        ContextCommand::new(self.command.clone(), args)
    }
}
