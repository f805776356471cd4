//! certwrap-verify command line tool
//!
//! Verifies a certificate against a trust store through a single verification context.

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::info;

use certwrap::common::{init_logger, Result};
use certwrap::config::{load_config, ConfigOverrides, OutputFormat, LOG_LEVEL_STR};
use certwrap::{verify_with_config, APP_NAME, VERSION};

/// Verify an X.509 certificate chain with OpenSSL
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Certificate to verify (PEM)
    #[clap(long)]
    cert: Option<PathBuf>,

    /// Trust anchors to add to the store (PEM bundle)
    #[clap(long)]
    ca_file: Option<PathBuf>,

    /// Untrusted intermediate certificates used to build the chain (PEM bundle)
    #[clap(long)]
    chain: Option<PathBuf>,

    /// Explicit trusted certificates, bypassing the store (PEM bundle)
    #[clap(long)]
    trusted: Option<PathBuf>,

    /// Also trust OpenSSL's default certificate locations
    #[clap(long)]
    default_paths: bool,

    /// Load configuration from a JSON file
    #[clap(long, env = "CERTWRAP_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Log level
    #[clap(long)]
    log_level: Option<String>,

    /// Output format (text, json)
    #[clap(long)]
    output: Option<String>,
}

fn run(args: Args) -> Result<bool> {
    // RUST_LOG takes precedence over the flag
    init_logger(args.log_level.as_deref().unwrap_or(LOG_LEVEL_STR));

    let output = args.output.as_deref().map(str::parse::<OutputFormat>).transpose()?;

    let config = load_config(args.config_file.as_deref())?.apply(ConfigOverrides {
        ca_file: args.ca_file,
        cert: args.cert,
        chain: args.chain,
        trusted: args.trusted,
        default_paths: args.default_paths,
        log_level: args.log_level,
        output,
    });

    info!("Starting {} v{} (OpenSSL {})", APP_NAME, VERSION, openssl::version::version());

    let report = verify_with_config(&config)?;

    match config.output {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| certwrap::WrapError::Config(format!("Failed to serialize report: {}", e)))?;
            println!("{}", json);
        }
    }

    Ok(report.valid)
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(2);
        }
    }
}
