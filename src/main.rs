mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use icswatch_core::config::ConfigOverrides;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "icswatch")]
#[command(about = "Watch a remote ICS calendar feed and report its events when it changes")]
struct Cli {
    /// Config file (defaults to ~/.config/icswatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct FeedArgs {
    /// Feed URL (http, https or webcal)
    #[arg(long)]
    url: Option<String>,

    /// Seconds between polls
    #[arg(short, long)]
    interval: Option<u64>,

    /// Number of events to show after a change
    #[arg(short, long)]
    limit: Option<usize>,

    /// File holding the last fingerprint
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// User-Agent header sent with each request
    #[arg(long)]
    user_agent: Option<String>,
}

impl From<FeedArgs> for ConfigOverrides {
    fn from(args: FeedArgs) -> Self {
        ConfigOverrides {
            url: args.url,
            poll_interval_secs: args.interval,
            max_events: args.limit,
            state_file: args.state_file,
            user_agent: args.user_agent,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed until interrupted
    Watch(FeedArgs),
    /// Poll the feed once and exit
    Check(FeedArgs),
    /// List the events in a local .ics file
    Events {
        file: PathBuf,

        /// Only show the first N events
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the fingerprint of a file
    Fingerprint { file: PathBuf },
    /// Forget the stored fingerprint so the next poll reports a change
    Reset {
        /// File holding the last fingerprint
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Watch(args) => {
            let cfg = commands::load_config(cli.config.as_deref(), args.into())?;
            commands::watch::run(cfg).await
        }
        Commands::Check(args) => {
            let cfg = commands::load_config(cli.config.as_deref(), args.into())?;
            commands::check::run(cfg).await
        }
        Commands::Events { file, limit } => commands::events::run(&file, limit),
        Commands::Fingerprint { file } => commands::fingerprint::run(&file),
        Commands::Reset { state_file } => {
            let overrides = ConfigOverrides {
                state_file,
                ..Default::default()
            };
            let cfg = commands::load_settings(cli.config.as_deref(), overrides)?;
            commands::reset::run(&cfg)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "icswatch=info,icswatch_core=info",
        1 => "icswatch=debug,icswatch_core=debug",
        _ => "icswatch=trace,icswatch_core=trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
