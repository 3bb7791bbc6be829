//! doc-lens Server and CLI
//!
//! A cross-platform binary for document analysis via CLI or HTTP server.
//!
//! # Usage
//!
//! ## CLI Mode
//! ```bash
//! doc-lens-server analyze --file receipt.png --model prebuilt-receipt --output-dir out/
//! doc-lens-server analyze --file statement.pdf --model prebuilt-layout --output json
//! ```
//!
//! ## Server Mode
//! ```bash
//! doc-lens-server serve --port 8080
//! ```
//!
//! The service endpoint and API key come from `--endpoint`/`--api-key`
//! or the `DOCLENS_ENDPOINT`/`DOCLENS_API_KEY` environment variables.

mod analyze;
mod cli;
mod config;
mod pdf;
mod server;

use clap::{Parser, Subcommand};
use doc_lens::client::ModelKind;
use doc_lens::core::AnalysisConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "doc-lens-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Document analysis via CLI or HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a single document via CLI
    Analyze {
        /// Local file path of the document to analyze
        #[arg(long)]
        file: PathBuf,

        /// Model selector (prebuilt-layout, prebuilt-receipt, prebuilt-creditCard)
        #[arg(long, default_value = "prebuilt-layout")]
        model: String,

        /// Analysis service endpoint
        #[arg(long, env = "DOCLENS_ENDPOINT")]
        endpoint: String,

        /// Analysis service API key
        #[arg(long = "api-key", env = "DOCLENS_API_KEY")]
        api_key: String,

        /// Locale hint forwarded to the analysis service
        #[arg(long, default_value = "en-US", env = "DOCLENS_LOCALE")]
        locale: String,

        /// Directory to save annotated page images
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format (json, text, pretty)
        #[arg(long, default_value = "pretty")]
        output: String,
    },
    /// Start the HTTP server
    Serve {
        /// Analysis service endpoint
        #[arg(long, env = "DOCLENS_ENDPOINT")]
        endpoint: String,

        /// Analysis service API key
        #[arg(long = "api-key", env = "DOCLENS_API_KEY")]
        api_key: String,

        /// Locale hint forwarded to the analysis service
        #[arg(long, default_value = "en-US", env = "DOCLENS_LOCALE")]
        locale: String,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "8080", env = "DOCLENS_PORT")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    doc_lens::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            model,
            endpoint,
            api_key,
            locale,
            output_dir,
            output,
        } => {
            // Fail on an unknown selector before touching the file or the network.
            let model: ModelKind = model.parse()?;
            let config = AnalysisConfig::new(endpoint, api_key).with_locale(locale);

            info!("Processing file: {}", file.display());
            cli::process_file(&file, config, model, output_dir.as_deref(), &output).await?;
        }
        Commands::Serve {
            endpoint,
            api_key,
            locale,
            host,
            port,
        } => {
            let config = config::ServerConfig {
                analysis: AnalysisConfig::new(endpoint, api_key).with_locale(locale),
                host,
                port,
            };

            info!("Starting server on {}:{}", config.host, config.port);
            server::run_server(config).await?;
        }
    }

    Ok(())
}
