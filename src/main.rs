use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use validate_address::{
    AddressCache, AddressError, AddressValidator, AsyncHttpClient, BatchOrchestrator, Cli,
    ConfigManager, FileDiscovery, MemoryCache, Output, VerbosityLevel, connect_cache,
};

fn init_logging(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConfigManager::load_config(&cli)
        .await
        .map_err(AddressError::from)
        .context("Failed to load configuration")?;
    debug!(app_env = ?config.app_env, "Configuration loaded");

    let cache: Arc<dyn AddressCache> = if config.app_env.is_test() {
        Arc::new(MemoryCache::new(config.cache.max_memory_entries))
    } else {
        connect_cache(&config.cache).await
    };
    info!(backend = cache.backend(), "Address cache ready");

    let api = AsyncHttpClient::new(config.api.clone()).context("Failed to create HTTP client")?;
    let validator = Arc::new(AddressValidator::new(cache, Arc::new(api)));

    let discovery = FileDiscovery::new(&config.files.csv_dir);
    let files = discovery.discover_files(cli.input_filename()).await?;
    debug!(csv_dir = %discovery.csv_dir().display(), files = files.len(), "Input files found");
    let output_path = match cli.output_filename() {
        Some(name) => Some(discovery.output_path(name).await?),
        None => None,
    };

    let verbosity = config.verbosity();
    let orchestrator =
        BatchOrchestrator::new(validator, config.rate_limit).with_output(Output::new(verbosity));
    let batch = orchestrator.run(&files, output_path.as_deref()).await?;

    if verbosity >= VerbosityLevel::Verbose {
        eprint!("{}", Output::new(verbosity).format_summary(&batch.summary));
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
