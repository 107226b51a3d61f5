//! Configuration loading from TOML files
//!
//! Config file is selected via the --config command line argument;
//! missing or unreadable files fall back to defaults.

use anyhow::{ensure, Context};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP ingestion port
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_server_port() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// Number of concurrent consumers
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Maximum buffered events before admission rejects
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Simulated per-event processing time (demo knob, 0 disables)
    #[serde(default)]
    pub processing_delay_ms: u64,
}

fn default_worker_count() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    100
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            processing_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSection {
    /// Interval between periodic metric reports
    #[serde(default = "default_metrics_interval")]
    pub interval_secs: u64,
}

fn default_metrics_interval() -> u64 {
    10
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { interval_secs: default_metrics_interval() }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TomlConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    pipeline: PipelineSection,
    #[serde(default)]
    metrics: MetricsSection,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    server_port: u16,
    worker_count: usize,
    queue_capacity: usize,
    processing_delay_ms: u64,
    metrics_interval_secs: u64,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: default_server_port(),
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            processing_delay_ms: 0,
            metrics_interval_secs: default_metrics_interval(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> anyhow::Result<Self> {
        let toml_config: TomlConfig = toml::from_str(content)
            .with_context(|| format!("Failed to parse config file {origin}"))?;

        ensure!(
            toml_config.pipeline.worker_count >= 1,
            "pipeline.worker_count must be positive in {origin}"
        );
        ensure!(
            toml_config.pipeline.queue_capacity >= 1,
            "pipeline.queue_capacity must be positive in {origin}"
        );

        Ok(Self {
            server_port: toml_config.server.port,
            worker_count: toml_config.pipeline.worker_count,
            queue_capacity: toml_config.pipeline.queue_capacity,
            processing_delay_ms: toml_config.pipeline.processing_delay_ms,
            metrics_interval_secs: toml_config.metrics.interval_secs,
            config_file: origin.to_string(),
        })
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Warning: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    // Getters for all config fields
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn processing_delay_ms(&self) -> u64 {
        self.processing_delay_ms
    }

    pub fn metrics_interval_secs(&self) -> u64 {
        self.metrics_interval_secs
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }
}
