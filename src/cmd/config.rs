//! Configuration view and validation commands - `tekstil config`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use tekstil::config::TekstilConfig;

use super::super::{Cli, ConfigCommands};

/// Show at most the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn config_file(cli: &Cli, project_dir: &Path) -> Option<PathBuf> {
    match &cli.config {
        Some(path) => Some(path.clone()),
        None => TekstilConfig::discover(project_dir),
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        println!("Configuration is valid.");
    } else {
        println!("Configuration warnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
    }
}

pub fn cmd_config(cli: &Cli, project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Tekstil Configuration");
            println!("=====================");
            println!();

            match config_file(cli, project_dir) {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No config file found; using defaults.");
                    println!("Run 'tekstil config init' to create one.");
                }
            }
            println!();

            let config = TekstilConfig::resolve(
                project_dir,
                cli.config.as_deref(),
                cli.api_url.as_deref(),
                cli.token.as_deref(),
            )?;

            println!("Effective values (with env/CLI overrides):");
            println!("[api]");
            println!("  base_url = \"{}\"", config.api.base_url);
            match &config.api.token {
                Some(token) => println!("  token = \"{}\"", mask(token)),
                None => println!("  token = (none)"),
            }
            println!("  timeout_secs = {}", config.api.timeout_secs);
            println!();
            println!("[labels]");
            println!("  print_endpoint = \"{}\"", config.labels.print_endpoint);
            println!("  output_dir = \"{}\"", config.labels.output_dir.display());
            println!();
            println!("[list]");
            println!("  page_size = {}", config.list.page_size);
            println!();
            println!("[notifications]");
            println!("  ws_path = \"{}\"", config.notifications.ws_path);
            println!(
                "  reconnect_delay_secs = {}",
                config.notifications.reconnect_delay_secs
            );
            match config.notifications.max_reconnects {
                Some(max) => println!("  max_reconnects = {}", max),
                None => println!("  max_reconnects = (unlimited)"),
            }
            println!();

            let warnings = config.validate();
            if !warnings.is_empty() {
                print_warnings(&warnings);
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if config_file(cli, project_dir).is_none() {
                println!("No config file found. Using defaults (valid).");
                return Ok(());
            }

            let config = TekstilConfig::resolve(
                project_dir,
                cli.config.as_deref(),
                cli.api_url.as_deref(),
                cli.token.as_deref(),
            )?;
            print_warnings(&config.validate());
            println!();
        }
        Some(ConfigCommands::Init) => {
            let path = TekstilConfig::project_path(project_dir);
            if path.exists() {
                println!("Config already exists at {}", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            TekstilConfig::default().save(&path)?;

            println!("Created {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, token, timeout_secs");
            println!("  - [labels] print_endpoint, output_dir");
            println!("  - [notifications] ws_path, reconnect_delay_secs, max_reconnects");
            println!();
        }
    }

    Ok(())
}
