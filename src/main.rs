use marketgreen_api::config::AppConfig;
use marketgreen_api::supabase::SupabaseClient;
use marketgreen_api::{app, error, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SUPABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Missing Supabase credentials are fatal: refuse to start rather than
    // serve with a dead client.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("configuration error: {}", err);
            std::process::exit(1);
        }
    };
    error::expose_error_detail(config.is_development());

    let supabase = match SupabaseClient::new(&config.supabase) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!("supabase client error: {}", err);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting MarketGreen API in {:?} mode", config.environment);
    match &config.cors.frontend_url {
        Some(url) => tracing::info!("Frontend URL: {}", url),
        None => tracing::info!("Frontend URL: not set (defaulting to localhost:5173)"),
    }
    tracing::info!(
        "Service role key configured: {}",
        config.supabase.service_role_key.is_some()
    );

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let state = AppState::new(config, supabase);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 MarketGreen API server listening on http://{}", bind_addr);
    println!("🔗 Health check: http://localhost:{}/health", listener.local_addr().map(|a| a.port()).unwrap_or_default());

    axum::serve(listener, app(state)).await.expect("server");
}
