//! capgate - HTTP gateway for the capacitor configuration optimizer.
//!
//! Usage:
//!   capgate serve [--port 8000] [--optimizer ./capacitor_optimizer]   # Start HTTP server
//!   capgate solve [--target 75] [--available 5,10,50]                 # Run once, print JSON

use capgate::config::{
    CorsConfig, ServerConfig, ANY_ORIGIN, DEFAULT_OPTIMIZER_PATH, DEFAULT_TIMEOUT_SECS,
};
use capgate::handler::find_config;
use capgate::{http_server, AppState, ConfigPayload};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "capgate")]
#[command(about = "HTTP gateway for the capacitor configuration optimizer")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ClapArgs, Debug)]
struct OptimizerArgs {
    /// Path to the optimizer executable
    #[arg(long, default_value = DEFAULT_OPTIMIZER_PATH)]
    optimizer: PathBuf,

    /// Seconds an optimizer run may take before it is killed
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,

        #[command(flatten)]
        optimizer: OptimizerArgs,

        /// Allowed CORS origin; repeat for several, `*` allows any
        #[arg(long = "cors-origin", default_value = ANY_ORIGIN)]
        cors_origins: Vec<String>,

        /// Allow credentialed cross-origin requests
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        cors_allow_credentials: bool,
    },

    /// Run a single optimization and print the result
    #[command(allow_negative_numbers = true)]
    Solve {
        #[command(flatten)]
        optimizer: OptimizerArgs,

        /// Target equivalent capacitance
        #[arg(long, default_value = "75")]
        target: f64,

        /// Number of series branches
        #[arg(long, default_value = "3")]
        branches: i64,

        /// Fixed capacitor value in each branch
        #[arg(long, default_value = "2.5")]
        fixed: f64,

        /// Maximum parallel capacitors per branch
        #[arg(long, default_value = "20")]
        max_parallel: i64,

        /// Comma-separated available capacitor values
        #[arg(long, value_delimiter = ',', default_value = "5,10,50")]
        available: Vec<f64>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capgate=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Serve {
            host,
            port,
            optimizer,
            cors_origins,
            cors_allow_credentials,
        } => {
            let config = ServerConfig {
                host,
                port,
                optimizer_path: optimizer.optimizer,
                timeout: Duration::from_secs(optimizer.timeout_secs),
                cors: CorsConfig {
                    origins: cors_origins,
                    allow_credentials: cors_allow_credentials,
                },
            };
            if let Err(e) = http_server::run_server(config).await {
                eprintln!("Error: {}", e);
                exit(1);
            }
        }
        Commands::Solve {
            optimizer,
            target,
            branches,
            fixed,
            max_parallel,
            available,
        } => {
            let config = ServerConfig {
                optimizer_path: optimizer.optimizer,
                timeout: Duration::from_secs(optimizer.timeout_secs),
                ..ServerConfig::default()
            };
            let payload = ConfigPayload {
                target,
                branches,
                fixed,
                max_parallel,
                available: Some(available),
            };
            match find_config(&AppState::from_config(&config), payload).await {
                Ok(result) => println!("{}", result),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            }
        }
    }
}
