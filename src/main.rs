use dotenv::dotenv;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{event, Level};
use tracing_subscriber::EnvFilter;
use url::Url;

use taskboard::api;
use taskboard::config::Config;
use taskboard::datastore::{MemoryTaskStore, SqliteTaskStore};
use taskboard::log;
use taskboard::service::TaskService;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::load()?;
    let env_filter = EnvFilter::try_from_env("TASKBOARD_LOG");
    log::setup(env_filter, config.log.as_ref());

    event!(Level::INFO, "Starting Taskboard: {}", env!("FULL_VERSION"));

    let server_config = api::ServerConfig {
        host: config.listen.host.clone(),
        port: config.listen.port,
        allowed_origin: config.http.allowed_origin.clone(),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("http-api")
        .enable_all()
        .build()?;

    let storage_url = Url::parse(&config.storage.url)?;
    match storage_url.scheme() {
        "memory" => {
            let service = TaskService::new(Arc::new(MemoryTaskStore::new()));
            runtime.spawn(api::Server::new(server_config, service).start());
        }
        "sqlite" => {
            // a bad storage url must fail the boot, not the first request
            let store = runtime.block_on(SqliteTaskStore::connect(&config.storage.url))?;
            let service = TaskService::new(Arc::new(store));
            runtime.spawn(api::Server::new(server_config, service).start());
        }
        other => anyhow::bail!("unsupported storage scheme '{}'", other),
    }

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;
    while !term.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(200));
    }

    event!(Level::INFO, "Shutting down.");
    runtime.shutdown_timeout(Duration::from_millis(500));
    Ok(())
}
