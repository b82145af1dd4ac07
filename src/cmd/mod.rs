//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                       |
//! |-----------------|----------------------------------------|
//! | `barcode`       | `Barcode`                              |
//! | `label`         | `Label`                                |
//! | `resource`      | `List`, `Create`, `Update`, `Delete`   |
//! | `notifications` | `Notifications`                        |
//! | `config`        | `Config`                               |

pub mod barcode;
pub mod config;
pub mod label;
pub mod notifications;
pub mod resource;

pub use barcode::cmd_barcode;
pub use config::cmd_config;
pub use label::{LabelOptions, cmd_label};
pub use notifications::cmd_notifications;
pub use resource::{cmd_create, cmd_delete, cmd_list, cmd_update};

use std::path::Path;

use anyhow::{Context, Result};
use tekstil::api::{ApiClient, token_source};
use tekstil::cache::QueryCache;
use tekstil::config::TekstilConfig;

use super::Cli;

/// Effective configuration plus the shared cache for one CLI invocation.
pub struct AppContext {
    pub config: TekstilConfig,
    pub cache: QueryCache,
}

impl AppContext {
    pub fn load(cli: &Cli, project_dir: &Path) -> Result<Self> {
        let config = TekstilConfig::resolve(
            project_dir,
            cli.config.as_deref(),
            cli.api_url.as_deref(),
            cli.token.as_deref(),
        )?;
        tracing::debug!(base_url = %config.api.base_url, "configuration loaded");
        Ok(Self {
            config,
            cache: QueryCache::new(),
        })
    }

    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::with_timeout(
            &self.config.api.base_url,
            token_source(self.config.api.token.as_deref()),
            self.config.api.timeout(),
        )
        .with_context(|| format!("Invalid API base URL '{}'", self.config.api.base_url))
    }
}

/// Read a JSON document from `path`, or stdin when `path` is `-`.
pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}
