use api::{auth::middleware::log_request, build_router, state::AppState};
use axum::{http::header::CONTENT_TYPE, middleware::from_fn};
use code_runner::PistonSandbox;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::{net::SocketAddr, process, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::{config, problem_bank::ProblemBank};

#[tokio::main]
async fn main() {
    let _log_guard = init_logging(&config::log_file());

    let db = match db::connect().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, path = %config::database_path(), "Failed to open room store");
            process::exit(1);
        }
    };

    if let Err(e) = Migrator::up(&db, None).await {
        tracing::error!(error = %e, "Failed to apply migrations");
        process::exit(1);
    }

    let problems = match ProblemBank::load(config::problem_bank_path()) {
        Ok(bank) => bank,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load problem bank");
            process::exit(1);
        }
    };

    let sandbox = match PistonSandbox::from_config() {
        Ok(sandbox) => sandbox,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build sandbox client");
            process::exit(1);
        }
    };

    let app_state = AppState::new(db, Arc::new(sandbox), problems);

    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_TYPE]);

    let app = build_router(app_state)
        .layer(from_fn(log_request))
        .layer(cors);

    let addr: SocketAddr = match format!("{}:{}", config::host(), config::port()).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "Invalid HOST/PORT");
            process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            process::exit(1);
        }
    };

    println!("Starting {} on http://{}", config::project_name(), addr);
    tracing::info!(%addr, sandbox = %config::sandbox_url(), "Server listening");

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %e, "Server crashed");
        process::exit(1);
    }
}

fn init_logging(log_file: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(true);

    let env_filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("api=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
