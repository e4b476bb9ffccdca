use clap::Parser;
use nw_api::AppState;
use nw_core::config::{HttpConfig, StoreConfig, UpstreamConfig};
use nw_core::{ArticleRepository, BusPublisher, Error, Result};
use nw_ingest::{IngestionScheduler, IngestionService, NewsApiClient};
use nw_store::{ArticleConsumer, MemoryRepository};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "two-stage news ingestion and storage pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch top headlines on a schedule and publish them to the bus
    Ingest {
        /// Run a single ingestion cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Consume articles from the bus, persist them and serve the read API
    Serve,
    /// Run both stages in one process over an in-memory bus
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { once } => run_ingest(once).await,
        Commands::Serve => run_serve().await,
        Commands::Run => run_combined().await,
    }
}

fn build_scheduler(
    publisher: Arc<dyn BusPublisher>,
    config: &UpstreamConfig,
) -> IngestionScheduler {
    let client = Arc::new(NewsApiClient::new(config));
    let service = Arc::new(IngestionService::new(client, publisher));
    IngestionScheduler::new(service, config.categories.clone(), config.fetch_interval)
}

#[cfg(feature = "kafka")]
async fn run_ingest(once: bool) -> Result<()> {
    let upstream = UpstreamConfig::from_env()?;
    let bus = nw_core::config::BusConfig::from_env()?;

    let publisher: Arc<dyn BusPublisher> = Arc::new(nw_bus::KafkaPublisher::new(&bus)?);
    info!(
        "📰 Ingestion stage starting: topic {}, interval {:?}",
        bus.topic, upstream.fetch_interval
    );

    let scheduler = build_scheduler(publisher, &upstream);
    if once {
        scheduler.run_cycle().await;
        return Ok(());
    }
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => info!("shutdown signal received, stopping scheduler"),
    }
    Ok(())
}

#[cfg(not(feature = "kafka"))]
async fn run_ingest(_once: bool) -> Result<()> {
    Err(Error::Config(
        "this binary was built without kafka support; rebuild with --features kafka or use the `run` command".to_string(),
    ))
}

#[cfg(feature = "kafka")]
async fn run_serve() -> Result<()> {
    let bus = nw_core::config::BusConfig::from_env()?;
    let store = StoreConfig::from_env()?;
    let http = HttpConfig::from_env()?;

    let repository = open_repository(&store).await?;
    let subscriber = nw_bus::KafkaSubscriber::new(&bus)?;
    let consumer = ArticleConsumer::new(Box::new(subscriber), repository.clone());
    tokio::spawn(consumer.run());

    serve_api(repository, &http).await
}

#[cfg(not(feature = "kafka"))]
async fn run_serve() -> Result<()> {
    Err(Error::Config(
        "this binary was built without kafka support; rebuild with --features kafka or use the `run` command".to_string(),
    ))
}

/// Single-process mode: scheduler, consumer and API share an in-memory bus.
async fn run_combined() -> Result<()> {
    let upstream = UpstreamConfig::from_env()?;
    let store = StoreConfig::from_env()?;
    let http = HttpConfig::from_env()?;

    let bus = nw_bus::MemoryBus::new();
    let subscriber = bus.subscribe()?;
    let repository = open_repository(&store).await?;
    let consumer = ArticleConsumer::new(Box::new(subscriber), repository.clone());
    tokio::spawn(consumer.run());

    let scheduler = build_scheduler(Arc::new(bus), &upstream);
    tokio::spawn(async move { scheduler.run().await });

    serve_api(repository, &http).await
}

async fn open_repository(config: &StoreConfig) -> Result<Arc<dyn ArticleRepository>> {
    if config.database_url.starts_with("memory:") {
        info!("💾 Using in-memory article store");
        return Ok(Arc::new(MemoryRepository::new()));
    }

    #[cfg(feature = "sqlite")]
    if config.database_url.starts_with("sqlite:") {
        info!("💾 Using sqlite article store at {}", config.database_url);
        let repository = nw_store::SqliteRepository::connect(&config.database_url).await?;
        return Ok(Arc::new(repository));
    }

    Err(Error::Config(format!(
        "unsupported database url: {}",
        config.database_url
    )))
}

async fn serve_api(repository: Arc<dyn ArticleRepository>, config: &HttpConfig) -> Result<()> {
    let app = nw_api::create_app(AppState { repository }).await;
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("🌐 Read API listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining requests");
        })
        .await?;
    Ok(())
}
