use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use patent_scout::{
    config::Config,
    models::{DEFAULT_NUM_RESULTS, MAX_NUM_RESULTS, MIN_NUM_RESULTS},
    routes::create_router,
    utils::init_logger,
    AppState, ResearchPipeline,
};

/// Search academic papers, summarize them and draft patent proposals
#[derive(Parser)]
#[command(name = "patent-scout")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve,
    /// Run one search from the terminal and print the report
    Search {
        /// Search keywords
        query: String,

        /// Number of papers to fetch (1-100)
        #[arg(short, long, default_value_t = DEFAULT_NUM_RESULTS)]
        num_results: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    let _log_guard = init_logger(&config.logging);

    info!("Configuration loaded: {:?}", config.server);
    info!(
        llm_configured = !config.llm.openai_api_key.is_empty(),
        proxy_configured = !config.search.scraperapi_key.is_empty(),
        developer_key_present = config.search.developer_key.is_some(),
        concurrency = config.pipeline.concurrency,
        "Credentials checked"
    );

    let pipeline = Arc::new(ResearchPipeline::from_config(&config)?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, pipeline).await,
        Commands::Search { query, num_results } => {
            let num_results = num_results.clamp(MIN_NUM_RESULTS, MAX_NUM_RESULTS);
            let report = pipeline
                .run(&query, num_results)
                .await
                .context("Search pipeline failed")?;
            print!("{}", report.render_text());
            Ok(())
        }
    }
}

async fn serve(config: Config, pipeline: Arc<ResearchPipeline>) -> anyhow::Result<()> {
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .context("HOST must be an IP address")?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState { config, pipeline };
    let app = create_router(state);

    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
