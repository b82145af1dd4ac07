use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "tekstil")]
#[command(version, about = "Tekstil OS client: labels, records and live notifications")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to .tekstil/tekstil.toml, then ~/.tekstil/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL. Overrides the config file and TEKSTIL_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token. Overrides the config file and TEKSTIL_API_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a barcode value (PREFIX-ID-TIMESTAMP-RANDOM)
    Barcode {
        /// Prefix such as YRN, FAB or QC
        prefix: String,
        /// Entity id
        id: i64,
        /// Use this epoch-millisecond timestamp instead of now
        #[arg(long)]
        timestamp_ms: Option<i64>,
    },
    /// Compose a label PDF from a JSON record, optionally sending it to the printer
    Label {
        /// yarn, fabric-roll, quality-control, production-card, sample-card,
        /// stock-roll, refakat-card, dye-recipe
        kind: String,
        /// JSON file holding the record (`-` for stdin)
        #[arg(long)]
        data: PathBuf,
        /// Output PDF path (defaults to <labels.output_dir>/<barcode>.pdf)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Also send the label to the server print queue
        #[arg(long, requires = "label_type_id")]
        print: bool,
        /// Label type id for the print queue
        #[arg(long)]
        label_type_id: Option<i64>,
        /// Open the PDF after writing it
        #[arg(long)]
        open: bool,
    },
    /// List records of a resource
    List {
        /// customers, orders, notifications, dye-recipes, production-cards, ...
        resource: String,
        #[arg(long, default_value = "1")]
        page: usize,
        /// Defaults to list.page_size from the config
        #[arg(long)]
        page_size: Option<usize>,
        /// Case-insensitive text search across columns
        #[arg(short, long)]
        search: Option<String>,
        /// Status filter (e.g. pending, in_production, active)
        #[arg(long)]
        status: Option<String>,
        /// Print the page as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a record from a JSON file
    Create {
        resource: String,
        #[arg(long)]
        data: PathBuf,
    },
    /// Update a record from a JSON file
    Update {
        resource: String,
        id: i64,
        #[arg(long)]
        data: PathBuf,
    },
    /// Delete a record
    Delete {
        resource: String,
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show notifications, mark them read, or follow them live
    Notifications {
        /// Keep running and print pushed notifications
        #[arg(short, long)]
        watch: bool,
        /// Mark one notification as read
        #[arg(long, conflicts_with = "mark_all_read")]
        mark_read: Option<i64>,
        /// Mark every notification as read
        #[arg(long)]
        mark_all_read: bool,
    },
    /// View, validate or create the configuration file
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default .tekstil/tekstil.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    tekstil::logging::init(cli.verbose);

    let project_dir = std::env::current_dir().context("Failed to get current directory")?;

    match &cli.command {
        Commands::Barcode {
            prefix,
            id,
            timestamp_ms,
        } => cmd::cmd_barcode(prefix, *id, *timestamp_ms)?,
        Commands::Label {
            kind,
            data,
            out,
            print,
            label_type_id,
            open,
        } => {
            let ctx = cmd::AppContext::load(&cli, &project_dir)?;
            let options = cmd::LabelOptions {
                out: out.clone(),
                print: print.then_some(label_type_id.unwrap_or_default()),
                open: *open,
            };
            cmd::cmd_label(&ctx, kind, data, options).await?;
        }
        Commands::List {
            resource,
            page,
            page_size,
            search,
            status,
            json,
        } => {
            let ctx = cmd::AppContext::load(&cli, &project_dir)?;
            let query = tekstil::listing::ListQuery {
                search: search.clone(),
                status: status.clone(),
                page: *page,
                page_size: page_size.unwrap_or(ctx.config.list.page_size),
            };
            cmd::cmd_list(&ctx, resource, query, *json).await?;
        }
        Commands::Create { resource, data } => {
            let ctx = cmd::AppContext::load(&cli, &project_dir)?;
            cmd::cmd_create(&ctx, resource, data).await?;
        }
        Commands::Update { resource, id, data } => {
            let ctx = cmd::AppContext::load(&cli, &project_dir)?;
            cmd::cmd_update(&ctx, resource, *id, data).await?;
        }
        Commands::Delete { resource, id, yes } => {
            let ctx = cmd::AppContext::load(&cli, &project_dir)?;
            cmd::cmd_delete(&ctx, resource, *id, *yes).await?;
        }
        Commands::Notifications {
            watch,
            mark_read,
            mark_all_read,
        } => {
            let ctx = cmd::AppContext::load(&cli, &project_dir)?;
            cmd::cmd_notifications(&ctx, *watch, *mark_read, *mark_all_read).await?;
        }
        Commands::Config { command } => {
            cmd::cmd_config(&cli, &project_dir, command.clone())?;
        }
    }

    Ok(())
}
