//! Layered client configuration.
//!
//! Settings are read from `.tekstil/tekstil.toml` in the working directory,
//! falling back to `~/.tekstil/config.toml`. Environment variables override
//! the file, and CLI flags override both.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//! token = "eyJhbGciOi..."
//! timeout_secs = 30
//!
//! [labels]
//! print_endpoint = "/api/labels/print"
//! output_dir = "labels"
//!
//! [list]
//! page_size = 10
//!
//! [notifications]
//! ws_path = "/ws/notifications"
//! reconnect_delay_secs = 5
//! max_reconnects = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const API_URL_ENV: &str = "TEKSTIL_API_URL";
pub const API_TOKEN_ENV: &str = "TEKSTIL_API_TOKEN";

const PROJECT_DIR: &str = ".tekstil";
const PROJECT_FILE: &str = "tekstil.toml";
const USER_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TekstilConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsConfig {
    #[serde(default = "default_print_endpoint")]
    pub print_endpoint: String,
    /// Where `label` writes PDFs when no `--out` is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_print_endpoint() -> String {
    "/api/labels/print".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("labels")
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            print_endpoint: default_print_endpoint(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    10
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    /// `None` reconnects forever.
    #[serde(default = "default_max_reconnects")]
    pub max_reconnects: Option<u32>,
}

fn default_ws_path() -> String {
    "/ws/notifications".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_max_reconnects() -> Option<u32> {
    Some(10)
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ws_path: default_ws_path(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            max_reconnects: default_max_reconnects(),
        }
    }
}

impl NotificationsConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

impl TekstilConfig {
    /// `<dir>/.tekstil/tekstil.toml`
    pub fn project_path(dir: &Path) -> PathBuf {
        dir.join(PROJECT_DIR).join(PROJECT_FILE)
    }

    /// `~/.tekstil/config.toml`
    pub fn user_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(PROJECT_DIR).join(USER_FILE))
    }

    /// First existing config file: project, then user.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let project = Self::project_path(dir);
        if project.exists() {
            return Some(project);
        }
        Self::user_path().filter(|p| p.exists())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse tekstil.toml")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize tekstil.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(API_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.token = Some(token);
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides(&mut self, api_url: Option<&str>, token: Option<&str>) {
        if let Some(url) = api_url {
            self.api.base_url = url.to_string();
        }
        if let Some(token) = token {
            self.api.token = Some(token.to_string());
        }
    }

    /// Build the effective configuration: file, then environment, then flags.
    pub fn resolve(
        dir: &Path,
        explicit: Option<&Path>,
        api_url: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(dir),
        };
        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.apply_overrides(api_url, token);
        Ok(config)
    }

    /// Non-fatal problems worth reporting from `config show`.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "api.base_url '{}' should start with http:// or https://",
                url
            ));
        }
        if self.api.timeout_secs == 0 {
            warnings.push("api.timeout_secs is 0; requests will fail immediately".to_string());
        }
        if !self.labels.print_endpoint.starts_with('/') {
            warnings.push(format!(
                "labels.print_endpoint '{}' should start with '/'",
                self.labels.print_endpoint
            ));
        }
        if self.list.page_size == 0 {
            warnings.push("list.page_size is 0; a page size of 1 will be used".to_string());
        }
        if !self.notifications.ws_path.starts_with('/') {
            warnings.push(format!(
                "notifications.ws_path '{}' should start with '/'",
                self.notifications.ws_path
            ));
        }
        warnings
    }
}
