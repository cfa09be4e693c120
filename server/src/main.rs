mod error;
mod extract;
mod prompt;
mod request_tracing;
mod routes;
mod server_config;
mod tokenizer;

use std::{env, net::SocketAddr, time::Duration};

use axum::extract::FromRef;
use mimalloc::MiMalloc;
use routes::AppRouter;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub type HttpClient = reqwest::Client;

#[derive(Clone, FromRef)]
pub struct ServerState {
    http_client: HttpClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::Layer::default().with_ansi(false))
        .init();

    // Force the config load up front; a missing key or broken config.toml
    // should abort startup, not the first request.
    println!("{}", *server_config::cfg);

    if tokenizer::init() {
        tracing::info!("tokenizer ready");
    }

    let http_client = reqwest::ClientBuilder::new()
        .use_rustls_tls()
        .timeout(Duration::from_secs(server_config::cfg.api.timeout_secs))
        .build()?;

    let state = ServerState { http_client };
    let router = AppRouter::create(state);

    let port = env::var("PORT").unwrap_or("5000".to_string());
    tracing::info!("Mailtriage server running on http://0.0.0.0:{}", port);

    let addr = SocketAddr::from(([0, 0, 0, 0], port.parse::<u16>()?));
    tracing::debug!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Shutting down");
        },
        _ = terminate => {
            tracing::info!("Shutting down");
        },
    }
}
