use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const UPLOADS_DIR: &str = "temp_uploads";

/// Main configuration structure that can be loaded from CLI or a config file
///
/// Example configuration file content
/// # GIF Creator Configuration
///
/// listen_on_port = 5000
/// workspace = "./data"
/// max_upload_mb = 64
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[serde(default)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    #[serde(default = "default_port")]
    pub listen_on_port: u16,

    /// Working directory, uploaded frames are held under `<workspace>/temp_uploads`
    #[arg(short = 'w', long, default_value = ".")]
    #[serde(default = "default_workspace")]
    pub workspace: String,

    /// Maximum accepted request body size in MiB
    #[arg(short, long, default_value_t = 64)]
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// Configuration file path
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_on_port: default_port(),
            workspace: default_workspace(),
            max_upload_mb: default_max_upload_mb(),
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Config::parse();

        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence unless left at their default
    fn merge_with_file(mut self, file_config: Config) -> Self {
        if self.listen_on_port == default_port() {
            self.listen_on_port = file_config.listen_on_port;
        }
        if self.workspace == default_workspace() {
            self.workspace = file_config.workspace;
        }
        if self.max_upload_mb == default_max_upload_mb() {
            self.max_upload_mb = file_config.max_upload_mb;
        }

        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workspace.is_empty() {
            return Err(anyhow::anyhow!("Workspace path cannot be empty"));
        }
        if self.max_upload_mb == 0 {
            return Err(anyhow::anyhow!("max_upload_mb must be greater than 0"));
        }

        Ok(())
    }

    pub fn uploads_dir(&self) -> PathBuf {
        Path::new(&self.workspace).join(UPLOADS_DIR)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn default_port() -> u16 {
    5000
}

fn default_workspace() -> String {
    ".".to_string()
}

fn default_max_upload_mb() -> usize {
    64
}
