use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobready_api::config::Config;
use jobready_api::llm_client::{self, LlmBackend, LlmClient};
use jobready_api::payments::razorpay::{PaymentGateway, RazorpayClient};
use jobready_api::routes::build_router;
use jobready_api::state::AppState;
use jobready_api::store::{KvStore, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "jobready_api={},tower_http={}",
                &config.rust_log, &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobReady API v{}", env!("CARGO_PKG_VERSION"));

    // Missing integrations are not fatal; the endpoints that need them
    // answer with CONFIG_ERROR instead.
    let store: Option<Arc<dyn KvStore>> = match config.redis_url.as_deref() {
        Some(url) => match RedisStore::open(url) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("Redis unavailable: {e}");
                None
            }
        },
        None => {
            warn!("REDIS_URL not set; verify and generate are disabled");
            None
        }
    };

    let llm: Option<Arc<dyn LlmBackend>> = match config.anthropic_api_key.clone() {
        Some(key) => match LlmClient::new(key) {
            Ok(client) => {
                info!("LLM client initialized (model: {})", llm_client::MODEL);
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("LLM client unavailable: {e}");
                None
            }
        },
        None => {
            warn!("ANTHROPIC_API_KEY not set; generate is disabled");
            None
        }
    };

    let gateway: Option<Arc<dyn PaymentGateway>> = match config.razorpay_credentials() {
        Some((key_id, key_secret)) => {
            match RazorpayClient::new(key_id.to_string(), key_secret.to_string()) {
                Ok(client) => {
                    info!("Razorpay client initialized (key: {key_id})");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    warn!("Razorpay client unavailable: {e}");
                    None
                }
            }
        }
        None => {
            warn!("Razorpay credentials not set; checkout is disabled");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        store,
        llm,
        gateway,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
