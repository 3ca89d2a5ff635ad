//! Configuration management for mogreps-ingest.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Command-line arguments for mogreps-ingest
#[derive(Parser, Debug, Default)]
#[command(name = "mogreps-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Bucket holding the model NetCDF files
    #[arg(long, env = "MOGREPS_SOURCE_BUCKET")]
    pub source_bucket: Option<String>,

    /// Key prefix selecting candidate source files
    #[arg(long, env = "MOGREPS_PREFIX")]
    pub prefix: Option<String>,

    /// Bucket receiving the dataset document
    #[arg(long, env = "MOGREPS_OUTPUT_BUCKET")]
    pub output_bucket: Option<String>,

    /// Local directory the source file is downloaded into
    #[arg(long, env = "MOGREPS_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,

    /// AWS region of both buckets
    #[arg(long, env = "MOGREPS_REGION")]
    pub region: Option<String>,

    /// Custom S3 endpoint (MinIO, localstack)
    #[arg(long, env = "MOGREPS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Index of the dimension group the dataset document describes
    #[arg(long, env = "MOGREPS_GROUP_INDEX")]
    pub group_index: Option<usize>,

    /// Emit a document with missing extent fields instead of failing
    #[arg(long, env = "MOGREPS_PERMISSIVE_EXTENT")]
    pub permissive_extent: bool,

    /// Path to JSON configuration file
    #[arg(short, long, env = "MOGREPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MOGREPS_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Object store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding the model NetCDF files
    #[serde(default = "default_source_bucket")]
    pub source_bucket: String,

    /// Key prefix selecting candidate source files
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Bucket receiving the dataset document
    #[serde(default = "default_output_bucket")]
    pub output_bucket: String,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL (None = AWS)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Allow plain HTTP connections
    #[serde(default = "default_allow_http")]
    pub allow_http: bool,
}

/// Metadata derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Which dimension group (in sorted key order) the dataset document describes
    #[serde(default = "default_group_index")]
    pub group_index: usize,

    /// Fail when the extent lacks spatial or temporal keys
    #[serde(default = "default_strict_extent")]
    pub strict_extent: bool,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Object store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Processing configuration
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Local staging directory for downloaded files
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments and environment
        if let Some(bucket) = args.source_bucket {
            config.storage.source_bucket = bucket;
        }
        if let Some(prefix) = args.prefix {
            config.storage.prefix = prefix;
        }
        if let Some(bucket) = args.output_bucket {
            config.storage.output_bucket = bucket;
        }
        if let Some(region) = args.region {
            config.storage.region = region;
        }
        if args.endpoint.is_some() {
            config.storage.endpoint = args.endpoint;
        }
        if let Some(dir) = args.staging_dir {
            config.staging_dir = dir;
        }
        if let Some(index) = args.group_index {
            config.processing.group_index = index;
        }
        if args.permissive_extent {
            config.processing.strict_extent = false;
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.storage = other.storage;
        self.processing = other.processing;
        self.staging_dir = other.staging_dir;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("source bucket", &self.storage.source_bucket),
            ("output bucket", &self.storage.output_bucket),
            ("prefix", &self.storage.prefix),
            ("region", &self.storage.region),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(IngestError::Config {
                    message: format!("{} cannot be empty", name),
                });
            }
        }

        if self.staging_dir.as_os_str().is_empty() {
            return Err(IngestError::Config {
                message: "Staging directory cannot be empty".to_string(),
            });
        }

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(IngestError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            processing: ProcessingConfig::default(),
            staging_dir: default_staging_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            source_bucket: default_source_bucket(),
            prefix: default_prefix(),
            output_bucket: default_output_bucket(),
            region: default_region(),
            endpoint: None,
            allow_http: default_allow_http(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            group_index: default_group_index(),
            strict_extent: default_strict_extent(),
        }
    }
}

// Default value functions for serde
fn default_source_bucket() -> String {
    "mogreps-uk".to_string()
}

fn default_prefix() -> String {
    "prods_op_mogreps-uk_20140101".to_string()
}

fn default_output_bucket() -> String {
    "mogreps-uk-json".to_string()
}

fn default_region() -> String {
    "eu-west-2".to_string()
}

fn default_allow_http() -> bool {
    true
}

fn default_group_index() -> usize {
    1
}

fn default_strict_extent() -> bool {
    true
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("/mnt/")
}

fn default_log_level() -> String {
    "info".to_string()
}
