//! userdir CLI
//!
//! Command-line interface for userdir - browse and edit a remote user directory.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use userdir_core::{Config, SortOrder};

mod commands;
mod output;
mod prompt;

use commands::user::{FormArgs, ListArgs};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "userdir")]
#[command(about = "userdir - Browse and edit a user directory")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log transport and store activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List users, one page at a time
    #[command(alias = "ls")]
    List(ListOptions),
    /// Show user details
    Show {
        /// User ID
        id: i64,
    },
    /// Create a new user
    #[command(alias = "add")]
    Create(FormArgs),
    /// Update an existing user
    #[command(alias = "edit")]
    Update {
        /// User ID
        id: i64,
        #[command(flatten)]
        fields: FormArgs,
    },
    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// User ID
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Args)]
struct ListOptions {
    /// Free-text search across name, username, email and department
    #[arg(short, long)]
    search: Option<String>,
    /// Filter by first name
    #[arg(long)]
    first_name: Option<String>,
    /// Filter by last name
    #[arg(long)]
    last_name: Option<String>,
    /// Filter by email
    #[arg(long)]
    email: Option<String>,
    /// Filter by department
    #[arg(long)]
    department: Option<String>,
    /// Sort field (id, name, email, username, phone, website, department)
    #[arg(long, default_value = "id")]
    sort: String,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,
    /// Users per page
    #[arg(long)]
    page_size: Option<usize>,
}

impl From<ListOptions> for ListArgs {
    fn from(options: ListOptions) -> Self {
        ListArgs {
            search: options.search.unwrap_or_default(),
            filters: userdir_core::FilterCriteria {
                first_name: options.first_name.unwrap_or_default(),
                last_name: options.last_name.unwrap_or_default(),
                email: options.email.unwrap_or_default(),
                department: options.department.unwrap_or_default(),
            },
            sort: options.sort.parse().unwrap_or_default(),
            order: if options.desc {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            },
            page: options.page,
            page_size: options.page_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let config = Config::load().context("Failed to load configuration")?;

    // Commands that don't need the store
    if let Commands::Config = cli.command {
        return commands::config::show(&config, &output);
    }

    // The backing API does not persist writes, so every run starts from a fresh load
    let mut store = commands::open_store(&config).await?;

    match cli.command {
        Commands::List(options) => {
            commands::user::list(&mut store, &config, options.into(), &output)
        }
        Commands::Show { id } => commands::user::show(&store, id, &output),
        Commands::Create(fields) => {
            commands::user::create(&mut store, &config, fields, &output).await
        }
        Commands::Update { id, fields } => {
            commands::user::update(&mut store, &config, id, fields, &output).await
        }
        Commands::Delete { id, yes } => commands::user::delete(&mut store, id, yes, &output).await,
        Commands::Config => unreachable!(), // Handled above
    }
}

/// Log to stderr; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "userdir_core=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
