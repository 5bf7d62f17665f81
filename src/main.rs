use std::sync::Arc;
use stock_price_loader::alpaca::{AlpacaClient, MarketData};
use stock_price_loader::config::AppConfig;
use stock_price_loader::database::repositories::{
    BarRepository, BarRepositoryImpl, CompanyRepository, CompanyRepositoryImpl, SummaryRepository,
    SummaryRepositoryImpl,
};
use stock_price_loader::database::{establish_connection_pool, get_conn};
use stock_price_loader::jobs::{DailyBarsJob, DailySummaryJob, MinuteBarsJob};
use stock_price_loader::Scheduler;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_price_loader=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("🗄️  Initializing PostgreSQL connection...");

    let pool = match establish_connection_pool(&config.database_url, config.db_pool_size) {
        Ok(pool) => {
            tracing::info!("✅ Database connection established successfully");
            pool
        }
        Err(e) => {
            tracing::error!("❌ Failed to establish database connection: {}", e);
            std::process::exit(1);
        }
    };

    // Create repositories
    let pool_clone = pool.clone();
    let company_repository =
        Arc::new(CompanyRepositoryImpl::new(move || get_conn(&pool_clone)))
            as Arc<dyn CompanyRepository>;

    let pool_clone = pool.clone();
    let bar_repository = Arc::new(BarRepositoryImpl::new(move || get_conn(&pool_clone)))
        as Arc<dyn BarRepository>;

    let pool_clone = pool.clone();
    let summary_repository =
        Arc::new(SummaryRepositoryImpl::new(move || get_conn(&pool_clone)))
            as Arc<dyn SummaryRepository>;

    // Create the market data client
    let market_data = match AlpacaClient::new(&config.alpaca) {
        Ok(client) => Arc::new(client) as Arc<dyn MarketData>,
        Err(e) => {
            tracing::error!("❌ Failed to create the market data client: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("✅ Market data client configured for {}", config.alpaca.data_base_url);

    // Create the ingestion jobs
    let minute_bars_job = MinuteBarsJob::new(
        Arc::clone(&market_data),
        Arc::clone(&company_repository),
        Arc::clone(&bar_repository),
        config.scheduler.max_concurrent_batches,
    );

    let daily_bars_job = DailyBarsJob::new(
        Arc::clone(&market_data),
        Arc::clone(&company_repository),
        Arc::clone(&bar_repository),
        config.scheduler.max_concurrent_batches,
    );

    let daily_summary_job =
        DailySummaryJob::new(company_repository, bar_repository, summary_repository);

    let scheduler = Scheduler::new(
        market_data,
        minute_bars_job,
        daily_bars_job,
        daily_summary_job,
        config.scheduler,
    );

    // Flip the shutdown flag on Ctrl+C; the scheduler drains its current
    // state and stops
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!("🚀 Stock price loader running");

    if let Err(e) = scheduler.run(shutdown_rx).await {
        tracing::error!("❌ Scheduler stopped with an error: {}", e);
        std::process::exit(1);
    }
}
