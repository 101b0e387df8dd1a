//! sheetledger - shared spending ledger on a spreadsheet grid

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "sheetledger")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a document as a ledger
    Register {
        /// Spreadsheet URL or document id
        sheet: String,

        /// Display name (defaults to the document id)
        #[arg(long, default_value = "")]
        name: String,

        /// Id of the owning participant
        #[arg(long)]
        owner: i64,

        /// Create an empty local document if none exists
        #[arg(long)]
        create: bool,
    },

    /// Append a spending record
    Append {
        /// Spreadsheet URL or document id
        #[arg(long)]
        sheet: String,

        /// Id of the spending participant
        #[arg(long)]
        user: i64,

        /// Column label of the spending participant
        #[arg(long)]
        name: String,

        /// Amount, e.g. 12.50 or 12,50
        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Issue a one-time invite token for a ledger
    Invite {
        #[arg(long)]
        sheet: String,

        /// Id of the inviting participant
        #[arg(long)]
        user: i64,
    },

    /// Join a ledger with an invite token
    Join {
        token: String,

        #[arg(long)]
        user: i64,
    },

    /// List the ledgers a participant belongs to
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        user: i64,

        #[arg(long, default_value = "20")]
        limit: usize,

        /// Continue after this document id
        #[arg(long)]
        after: Option<String>,
    },

    /// Print a ledger document
    Show {
        #[arg(long)]
        sheet: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SHEETLEDGER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let workspace = commands::Workspace::open(cli.config.as_deref())?;

    match cli.command {
        Commands::Register {
            sheet,
            name,
            owner,
            create,
        } => workspace.register(&sheet, &name, owner, create),
        Commands::Append {
            sheet,
            user,
            name,
            amount,
            description,
        } => workspace.append(&sheet, user, &name, &amount, &description),
        Commands::Invite { sheet, user } => workspace.invite(&sheet, user),
        Commands::Join { token, user } => workspace.join(&token, user),
        Commands::List { user, limit, after } => workspace.list(user, limit, after.as_deref()),
        Commands::Show { sheet } => workspace.show(&sheet),
    }
}
