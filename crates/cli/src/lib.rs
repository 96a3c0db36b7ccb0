pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shopsense_core::config::{AppConfig, LoadOptions, LogFormat};

use commands::cart::CartAction;
use commands::recommend::RecommendArgs;

#[derive(Debug, Parser)]
#[command(
    name = "shopsense",
    about = "ShopSense personalization engine shell",
    long_about = "Chat with the shopping assistant, inspect recommendations, simulate scans, and manage the local store.",
    after_help = "Examples:\n  shopsense chat \"recommend electronics under $200\"\n  shopsense recommend --viewed 3 --limit 3\n  shopsense history"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Send one chat message and print the assistant's reply")]
    Chat {
        #[arg(help = "Message text")]
        message: String,
    },
    #[command(about = "Print the persisted conversation")]
    History,
    #[command(about = "Delete the persisted conversation")]
    Clear,
    #[command(about = "Rank the catalog, optionally after replaying views and searches")]
    Recommend {
        #[arg(long, help = "Maximum number of products to return")]
        limit: Option<usize>,
        #[arg(long = "viewed", help = "Product id to count as viewed (repeatable)")]
        viewed: Vec<String>,
        #[arg(long = "searched", help = "Search query to replay (repeatable)")]
        searched: Vec<String>,
    },
    #[command(about = "Run the mock recognizer on a camera frame")]
    Scan {
        #[arg(long, help = "Image file to submit; an empty frame is used when omitted")]
        image: Option<PathBuf>,
        #[arg(long, help = "Seed for reproducible recognition results")]
        seed: Option<u64>,
    },
    #[command(about = "List the demo catalog")]
    Catalog,
    #[command(about = "Inspect or change the stored cart")]
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    Show,
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    Remove {
        product_id: String,
    },
    Update {
        product_id: String,
        quantity: u32,
    },
    Clear,
}

impl From<CartCommand> for CartAction {
    fn from(command: CartCommand) -> Self {
        match command {
            CartCommand::Show => Self::Show,
            CartCommand::Add { product_id, quantity } => Self::Add { product_id, quantity },
            CartCommand::Remove { product_id } => Self::Remove { product_id },
            CartCommand::Update { product_id, quantity } => Self::Update { product_id, quantity },
            CartCommand::Clear => Self::Clear,
        }
    }
}

/// Logs go to stderr so stdout stays a single JSON payload.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands report config errors themselves; logging just falls back to defaults.
    let logging_config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Chat { message } => commands::chat::run(&message),
        Command::History => commands::history::run(),
        Command::Clear => commands::history::clear(),
        Command::Recommend { limit, viewed, searched } => {
            commands::recommend::run(RecommendArgs { limit, viewed, searched })
        }
        Command::Scan { image, seed } => commands::scan::run(image, seed),
        Command::Catalog => commands::catalog::run(),
        Command::Cart { action } => commands::cart::run(action.into()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
