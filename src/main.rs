/// API сервер дашборда переписи

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use census_dashboard::{
    api::{router, AppState},
    config::AppConfig,
    DataNormalizer, DatasetCache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let normalizer = DataNormalizer::new().with_encodings(config.encodings.clone());
    let data_path = config.data_path.clone();

    // Прогрев кэша; ошибка не фатальна, запросы вернут её клиенту
    let cache = tokio::task::spawn_blocking(move || {
        let mut cache = DatasetCache::new(normalizer);
        match cache.get_or_load(&data_path) {
            Ok(dataset) => tracing::info!(
                "Dataset ready: {} rows, period {}",
                dataset.meta.rows,
                dataset.meta.reference_period.as_deref().unwrap_or("unknown")
            ),
            Err(e) => tracing::warn!("Dataset not loaded at startup: {}", e),
        }
        cache
    })
    .await
    .context("cache warm-up task failed")?;

    let app = router(AppState::new(config.data_path.clone(), cache));

    let addr = config.resolve_addr().await?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
