use std::{env, fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::middleware;
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use finance_tracker::{
    AppState, PasswordHash, TokenConfig, build_router, graceful_shutdown, logging_middleware,
};

/// The longest a bearer token may be valid for: one year.
const MAX_TOKEN_DURATION_HOURS: i64 = 24 * 365;

/// The REST API server for the finance tracker.
///
/// The secret used to sign bearer tokens is read from the `JWT_SECRET`
/// environment variable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The IP address to serve the API from.
    #[arg(short, long, default_value = "127.0.0.1")]
    address: String,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// How long bearer tokens are valid for, in hours.
    #[arg(
        long,
        default_value_t = 24,
        value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_DURATION_HOURS),
    )]
    token_duration_hours: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr: SocketAddr = format!("{}:{}", args.address, args.port)
        .parse()
        .expect("Could not parse the server address.");

    let secret =
        env::var("JWT_SECRET").expect("The environment variable 'JWT_SECRET' must be set");

    let connection = Connection::open(&args.db_path).expect("Could not open the database.");
    let state = AppState::new(
        connection,
        &secret,
        TokenConfig {
            token_duration: Duration::hours(args.token_duration_hours),
            password_cost: PasswordHash::DEFAULT_COST,
        },
    )
    .expect("Could not initialize the database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly.");
}

fn setup_logging() {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}
