use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use transaction_tracker::{
    AppState, AuthConfig, PaginationConfig, build_router, get_jwt_secret, graceful_shutdown,
    parse_port_or_default,
};

/// The environment variable holding the secret for signing bearer tokens.
const JWT_SECRET_KEY: &str = "JWT_SECRET";
/// The environment variable the port is read from when `--port` is not given.
const PORT_KEY: &str = "PORT";
const DEFAULT_PORT: u16 = 4002;

/// The REST API server for transaction_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, default_value = "transaction.db")]
    db_path: PathBuf,

    /// The port to serve the API from. Falls back to the PORT environment variable, then 4002.
    #[arg(short, long)]
    port: Option<u16>,

    /// How long a bearer token is valid for after logging in.
    #[arg(long, default_value_t = 60)]
    token_duration_minutes: u32,

    /// File path for the debug log.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // A missing .env file is fine, the variables may be set some other way.
    let _ = dotenvy::dotenv();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!("Could not set up logging: {error}");
        exit(1);
    }

    let port = match args.port {
        Some(port) => port,
        None => match parse_port_or_default(PORT_KEY, DEFAULT_PORT) {
            Ok(port) => port,
            Err(error) => {
                tracing::error!("{error}");
                exit(1);
            }
        },
    };

    let jwt_secret = match get_jwt_secret(JWT_SECRET_KEY) {
        Ok(secret) => secret,
        Err(error) => {
            tracing::error!("{error}");
            exit(1);
        }
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database at {:?}: {error}", args.db_path);
            exit(1);
        }
    };

    let auth_config = AuthConfig {
        token_duration: time::Duration::minutes(args.token_duration_minutes.into()),
        ..Default::default()
    };

    let state = match AppState::new(
        conn,
        &jwt_secret,
        auth_config,
        PaginationConfig::default(),
    ) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not initialize the app: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &Path) -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(env_filter))
        .with(debug_log.with_filter(filter::LevelFilter::DEBUG))
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
