use movie_recommender::{
    api::{create_router, AppState},
    config::Config,
    data::FileDatasetLoader,
    services::RecommendationEngine,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_recommender=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Both datasets are loaded and indexed before the server accepts requests
    let loader = FileDatasetLoader::from_config(&config)?;
    let engine = RecommendationEngine::load(&loader, &config.engine_config()).await?;
    let state = AppState::new(engine, config.presentation());

    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
