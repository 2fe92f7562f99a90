use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use o2c_discovery_lib::config::AppConfig;
use o2c_discovery_lib::file_storage::FileRecordSink;
use o2c_discovery_lib::interview::{DiscoveryEngine, Orchestrator};
use o2c_discovery_lib::llm::HttpCompletionClient;
use o2c_discovery_lib::server::{self, ServerAppState};

/// O2C Discovery - conversational Order-to-Cash process discovery server
#[derive(Parser, Debug)]
#[command(name = "o2c-discovery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to (overrides the config file)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind the server to (overrides the config file)
    #[arg(long)]
    bind: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Completion-service API key (or set TOGETHER_API_KEY)
    #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory for the interview record file
    #[arg(long)]
    records_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    if let Some(key) = cli.api_key {
        config.llm.api_key = Some(key);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(dir) = cli.records_dir {
        config.storage.records_dir = Some(dir);
    }

    let llm_config = config.llm_config().map_err(anyhow::Error::msg)?;
    let oracle = Arc::new(HttpCompletionClient::new(llm_config)?);
    let sink = Arc::new(FileRecordSink::new(config.records_dir()));

    // a bad question flow is fatal at startup, never mid-interview
    let engine = DiscoveryEngine::new(oracle.clone(), sink, config.interview)?;
    let orchestrator = Arc::new(Orchestrator::new(engine, oracle.clone()));

    let port = config.server.port;
    let bind = config.server.bind.clone();
    let cors_origins = config.server.cors_origins.clone();
    let state = ServerAppState::new(orchestrator, oracle, config);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        server::run_server(port, &bind, state, &cors_origins)
            .await
            .map_err(anyhow::Error::msg)
    })
}
