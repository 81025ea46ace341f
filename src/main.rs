use churn_profit::state::{AppState, DbCommand};
use churn_profit::{batch, config, db, server};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("churn_profit starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        cost_benefit = %cfg.cost_benefit,
        strategy = %cfg.sweep_strategy,
        max_observations = cfg.max_observations,
        max_exact_observations = cfg.max_exact_observations,
        "configuration loaded"
    );

    // Init database
    let db_pool = match db::init_db(&cfg.data_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("database init error: {e}");
            std::process::exit(1);
        }
    };

    let (db_tx, db_rx) = mpsc::channel::<DbCommand>(1024);
    let app_state = AppState::new(cfg.clone(), db_pool.clone(), db_tx);

    // DB writer task (dedicated, owns all writes)
    let db_pool_writer = db_pool.clone();
    let writer_counters = app_state.counters.clone();
    tokio::spawn(async move {
        db::run_db_writer(db_pool_writer, db_rx, writer_counters).await;
    });

    // Startup batch, if configured
    if let Some(path) = &cfg.eval_input {
        tracing::info!(path = %path.display(), "evaluating startup batch");
        match batch::load_request(path) {
            Ok(request) => {
                if let Err(e) = batch::run_batch(&app_state, request).await {
                    tracing::error!("startup batch failed: {e}");
                }
            }
            Err(e) => tracing::error!("cannot read startup batch: {e}"),
        }
    }

    // Axum HTTP server
    let app = server::router(app_state.clone());
    let addr = format!("0.0.0.0:{}", cfg.server_port);
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
