// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use exam_session::clock::SystemClock;
use exam_session::config::Config;
use exam_session::routes;
use exam_session::state::{AppState, ExamStore};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "exam-backend.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.jwt_secret.is_none() {
        tracing::error!("JWT_SECRET must be set");
        return Err("JWT_SECRET must be set".into());
    }

    let store = ExamStore::new();
    if let Some(path) = &config.seed_file {
        let count = store.load_seed_file(path).await?;
        tracing::info!("Seeded {} exam(s) from {}", count, path);
    }

    let listen_addr = config.listen_addr;
    let state = AppState {
        store,
        config,
        clock: Arc::new(SystemClock),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("Exam backend listening on {}", listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
