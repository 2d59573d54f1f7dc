mod cmd;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "sitewright",
    about = "Compose and deploy websites for service businesses",
    version,
    propagate_version = true
)]
struct Cli {
    /// Base URL of the sitewright API server
    #[arg(
        long,
        global = true,
        env = "SITEWRIGHT_SERVER",
        default_value = "http://localhost:8080"
    )]
    server: String,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a site locally from a business profile, without deploying
    Compose {
        /// Business profile file (.yaml or .json)
        profile: PathBuf,

        /// Website identifier (lowercase alphanumeric with hyphens)
        #[arg(long)]
        website_id: String,

        /// Write rendered pages into this directory instead of printing a summary
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Queue a deployment through the API server
    Deploy {
        /// Business profile file (.yaml or .json)
        profile: PathBuf,

        /// Website identifier
        #[arg(long)]
        website_id: String,
    },

    /// Show the status of one deployment
    Status { deployment_id: Uuid },

    /// List a website's deployment history, newest first
    History { website_id: String },

    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Path to the deployment registry database
        #[arg(long, default_value = "sitewright.redb")]
        registry: PathBuf,

        /// Base URL of the hosting control plane
        #[arg(
            long,
            env = "SITEWRIGHT_CONTROL",
            default_value = "http://localhost:9000"
        )]
        control_base: String,

        /// Composition config file (.yaml); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Compose {
            profile,
            website_id,
            out,
        } => cmd::compose::run(&profile, &website_id, out.as_deref(), cli.json),
        Commands::Deploy {
            profile,
            website_id,
        } => cmd::deploy::run(&cli.server, &profile, &website_id, cli.json),
        Commands::Status { deployment_id } => {
            cmd::status::run_status(&cli.server, deployment_id, cli.json)
        }
        Commands::History { website_id } => {
            cmd::status::run_history(&cli.server, &website_id, cli.json)
        }
        Commands::Serve {
            port,
            registry,
            control_base,
            config,
        } => cmd::serve::run(port, &registry, control_base, config.as_deref()),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
