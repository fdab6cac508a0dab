use clap::{Parser, Subcommand};
use fitlog::cli::{commands, OutputFormat};
use fitlog::config::DEFAULT_SOURCE_DIR;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(author, version, about = "Import activity recordings and query training totals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Database file (defaults to the user data directory)
    #[arg(long, global = true, env = "FITLOG_DB")]
    db: Option<String>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import recordings into the database
    Ingest {
        /// Directory of recordings (an Activity/ subdirectory is used if present)
        #[arg(short, long, env = "FITLOG_SOURCE", default_value = DEFAULT_SOURCE_DIR)]
        src: String,
        /// Drop all stored data before importing
        #[arg(long)]
        reset: bool,
    },
    /// Activity count, distance and time per period
    Totals {
        /// week, month, year or all
        #[arg(short, long, default_value = "week")]
        group_by: String,
        /// Start of window (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        from: Option<String>,
        /// End of window, inclusive
        #[arg(long)]
        to: Option<String>,
    },
    /// Chosen columns for every activity in a window
    Summary {
        /// Start of window (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        from: Option<String>,
        /// End of window, inclusive
        #[arg(long)]
        to: Option<String>,
        /// Activity columns, e.g. total_distance avg_heart_rate
        columns: Vec<String>,
    },
    /// Show one activity and its laps
    Activity {
        /// Activity start time (YYYY-MM-DD HH:MM:SS, UTC)
        start_time: String,
        /// Also list the recorded samples
        #[arg(long)]
        samples: bool,
    },
    /// Show database location and row counts
    Status,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "fitlog=debug" } else { "fitlog=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ingest { src, reset } => commands::run_ingest(cli.db, &src, reset, cli.format),
        Commands::Totals { group_by, from, to } => {
            commands::totals(cli.db, &group_by, from, to, cli.format)
        }
        Commands::Summary { from, to, columns } => {
            commands::summary(cli.db, from, to, columns, cli.format)
        }
        Commands::Activity {
            start_time,
            samples,
        } => commands::show_activity(cli.db, &start_time, samples, cli.format),
        Commands::Status => commands::status(cli.db, cli.format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", fitlog::error::format_user_error(&e));
        std::process::exit(1);
    }
}
