//! cmyk-client – command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cmyk_client::{ApiClient, DEFAULT_URL, convert_image, report};
use tracing_subscriber::EnvFilter;

/// Convert RGB images to CMYK using the conversion service.
#[derive(Debug, Parser)]
#[command(name = "cmyk-client", version, about)]
struct Args {
    /// Path to the image file
    image: PathBuf,

    /// Path to save the converted file (default: `{name}_cmyk.tiff`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Base URL of the conversion service
    #[arg(long, env = "CMYK_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Log HTTP activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "cmyk_client=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let client = match ApiClient::new(&args.url) {
        Ok(client) => client,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    match convert_image(&client, &args.image, args.output.as_deref()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
