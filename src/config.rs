//! Server configuration.
//!
//! Values come from command-line flags (each also readable from an
//! environment variable), then an optional YAML file, then defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:4221";
pub const DEFAULT_DIRECTORY: &str = "/tmp";
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// How a connection collects the request bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Read until the headers and any declared body have arrived.
    #[default]
    Buffered,
    /// One read of at most 1024 bytes; anything beyond is dropped.
    Single,
}

/// Command-line flags.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sparrow")]
#[command(about = "Minimal HTTP/1.1 server for echo and file transfer")]
#[command(version)]
pub struct Args {
    /// Directory from which files are served and into which they are written
    #[arg(long, env = "DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "LISTEN")]
    pub listen: Option<String>,

    /// Optional YAML configuration file
    #[arg(long, env = "SPARROW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Request read strategy
    #[arg(long, value_enum, env = "READ_MODE")]
    pub read_mode: Option<ReadMode>,
}

/// Contents of the YAML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub listen_addr: Option<String>,
    pub directory: Option<PathBuf>,
    pub read_mode: Option<ReadMode>,
    pub max_request_bytes: Option<usize>,
    /// Seconds; 0 disables the timeout
    pub read_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub directory: PathBuf,
    pub read_mode: ReadMode,
    pub max_request_bytes: usize,
    pub read_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            read_mode: ReadMode::default(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            read_timeout: Some(Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS)),
        }
    }
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid configuration file")
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text)
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(args, file))
    }

    /// Merges flags over file values over defaults.
    pub fn resolve(args: Args, file: FileConfig) -> Self {
        let defaults = Self::default();

        let read_timeout = match file.read_timeout_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => defaults.read_timeout,
        };

        Self {
            listen_addr: args
                .listen
                .or(file.listen_addr)
                .unwrap_or(defaults.listen_addr),
            directory: args
                .directory
                .or(file.directory)
                .unwrap_or(defaults.directory),
            read_mode: args
                .read_mode
                .or(file.read_mode)
                .unwrap_or(defaults.read_mode),
            max_request_bytes: file
                .max_request_bytes
                .unwrap_or(defaults.max_request_bytes),
            read_timeout,
        }
    }

    /// Checks the serving directory exists and is a directory.
    pub fn validate(&self) -> anyhow::Result<()> {
        let meta = std::fs::metadata(&self.directory).with_context(|| {
            format!("failed to stat directory {}", self.directory.display())
        })?;
        if !meta.is_dir() {
            bail!("{} is not a directory", self.directory.display());
        }
        if self.max_request_bytes == 0 {
            bail!("max_request_bytes must be greater than zero");
        }
        Ok(())
    }
}
