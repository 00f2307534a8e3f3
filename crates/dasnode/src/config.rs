use anyhow::{Context, Result};
use dasmesh_das::{DasConfig, DasOptions, RetryPolicy};
use dasmesh_routing::TransportSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub das: DasOptions,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(skip)]
    config_file_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of validator nodes besides the builder
    pub validators: usize,
    /// Seed for node identifiers and transport randomness
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Unreliable,
    Reliable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,
    #[serde(default)]
    pub drop_rate: f64,
    #[serde(default = "default_min_delay")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_min_delay() -> u64 {
    10
}

fn default_max_delay() -> u64 {
    100
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Unreliable,
            drop_rate: 0.0,
            min_delay_ms: default_min_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl TransportConfig {
    /// Loss and latency model for this configuration
    pub fn settings(&self) -> TransportSettings {
        match self.kind {
            TransportKind::Reliable => TransportSettings::reliable(self.min_delay_ms),
            TransportKind::Unreliable => TransportSettings {
                drop_rate: self.drop_rate,
                min_delay_ms: self.min_delay_ms,
                max_delay_ms: self.max_delay_ms,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Logical time between two rounds
    #[serde(default = "default_round_interval")]
    pub round_interval_ms: u64,
}

fn default_rounds() -> u32 {
    1
}

fn default_round_interval() -> u64 {
    10_000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            round_interval_ms: default_round_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found: {}\nRun with --init to create a new configuration",
                config_path.display()
            );
        }

        let contents =
            fs::read_to_string(&config_path).context("Failed to read configuration file")?;

        let mut config = Self::from_yaml(&contents)?;
        config.config_file_path = config_path;

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(contents).context("Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    /// Create a new default configuration and write it to disk
    pub fn create_default(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Config {
            network: NetworkConfig {
                validators: 100,
                seed: 0,
            },
            das: DasOptions {
                mapping_fn: Some(0),
                sample_copy_per_node: Some(2),
                block_dim_size: Some(dasmesh_das::DEFAULT_BLOCK_DIMENSION),
                request_timeout_ms: Some(dasmesh_das::DEFAULT_REQUEST_TIMEOUT_MS),
                retry: RetryPolicy::Never,
            },
            transport: TransportConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
            config_file_path: config_path.clone(),
        };

        let yaml = serde_yaml::to_string(&config)?;
        fs::write(&config_path, yaml)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        Ok(config)
    }

    /// Check every section that can be checked without running
    pub fn validate(&self) -> Result<()> {
        self.das_config()?;
        self.transport
            .settings()
            .validate()
            .context("Invalid transport section")?;
        Ok(())
    }

    /// The validated DAS configuration shared by all nodes
    pub fn das_config(&self) -> Result<Arc<DasConfig>> {
        dasmesh_core::init(&self.das).context("Invalid das section")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file_path
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dasnode")
            .join("config.yaml")
    }
}
