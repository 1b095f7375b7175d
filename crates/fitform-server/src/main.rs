mod api;
mod entitlement;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    entitlement::EntitlementPolicy,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(fitform_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = fitform_db::PoolConfig::from_app_config(&config);
    let pool = fitform_db::connect_pool(&config.database_url, pool_config).await?;
    fitform_db::run_migrations(&pool).await?;

    let shopify = match &config.shopify_access_token {
        Some(token) => Some(Arc::new(fitform_shopify::ShopifyAdminClient::new(
            token,
            &config.shopify_api_version,
            config.shopify_timeout_secs,
            config.shopify_max_retries,
            config.shopify_retry_backoff_base_ms,
        )?)),
        None => None,
    };

    let entitlement = match &shopify {
        Some(client) => {
            tracing::info!("plan-based entitlement checks enabled");
            EntitlementPolicy::PerPlan(Arc::clone(client))
        }
        None => {
            tracing::info!("no Shopify access token configured; entitlement checks disabled");
            EntitlementPolicy::AllowAll
        }
    };

    let auth = AuthState::from_env(matches!(config.env, fitform_core::Environment::Development))?;
    let state = AppState {
        pool,
        shopify,
        entitlement,
        upload_poll_retries: config.upload_poll_retries,
        upload_poll_delay_ms: config.upload_poll_delay_ms,
    };
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
