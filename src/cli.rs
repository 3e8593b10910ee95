use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::DEFAULT_TOP_K;

#[derive(Parser)]
#[command(name = "niftypulse")]
#[command(about = "NIFTY50 intraday scanner and alerting CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the universe once and print the ranking
    Scan {
        /// Number of ranked entries to show
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,
        /// Ranking metric: score or change
        #[arg(long, default_value = "score")]
        by: String,
        /// Also send the summary to Telegram
        #[arg(long)]
        notify: bool,
    },
    /// Re-scan on a fixed interval until interrupted
    Watch {
        /// Seconds between scan cycles
        #[arg(long, default_value_t = 60)]
        interval: u64,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,
        /// Ranking metric: score or change
        #[arg(long, default_value = "score")]
        by: String,
        /// Send the summary to Telegram on every cycle
        #[arg(long)]
        notify: bool,
    },
    /// Send the ranked summary (or a test message) to Telegram
    Alert {
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,
        /// Ranking metric: score or change
        #[arg(long, default_value = "score")]
        by: String,
        /// Merge new inbox senders into the known-recipients file first
        #[arg(long)]
        discover: bool,
        /// Send a fixed test message instead of the ranking
        #[arg(long)]
        test: bool,
    },
    /// Manage manual portfolio entries and stop-loss checks
    Portfolio {
        #[command(subcommand)]
        action: PortfolioAction,
    },
    /// Show fallback-cache status
    Status,
}

#[derive(Subcommand)]
pub enum PortfolioAction {
    /// Record a buy (overwrites an existing entry for the symbol)
    Buy {
        symbol: String,
        price: f64,
        quantity: i64,
    },
    /// Remove a position
    Sell { symbol: String },
    /// List positions
    List,
    /// Check positions against the stop-loss threshold
    Check {
        /// Send an alert for breached positions
        #[arg(long)]
        notify: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { top, by, notify } => {
            commands::scan::run(top, &by, notify);
        }
        Commands::Watch {
            interval,
            top,
            by,
            notify,
        } => {
            commands::watch::run(interval, top, &by, notify);
        }
        Commands::Alert {
            top,
            by,
            discover,
            test,
        } => {
            commands::alert::run(top, &by, discover, test);
        }
        Commands::Portfolio { action } => {
            commands::portfolio::run(action);
        }
        Commands::Status => {
            commands::status::run();
        }
    }
}
