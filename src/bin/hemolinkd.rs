use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use chrono::Duration;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use hemolink::{
    AppState, AuthConfig, create_auth_router, create_blood_request_router, create_donation_router,
    create_donor_router, create_facility_router, create_stats_router,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "PostgreSQL database URL (default: $DATABASE_URL)")]
    database_url: Option<String>,
    #[arrrg(optional, "Secret for signing access tokens (default: $HEMOLINK_TOKEN_SECRET)")]
    token_secret: Option<String>,
    #[arrrg(optional, "Access token lifetime in days")]
    token_lifetime_days: Option<u16>,
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<u16>,
    #[arrrg(optional, "Allowed CORS origin (default: any origin)")]
    cors_origin: Option<String>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

const HELP_TEXT: &str = r#"hemolinkd - Hemolink daemon

USAGE:
    hemolinkd [OPTIONS]

OPTIONS:
    --database-url <URL>        PostgreSQL database URL [default: $DATABASE_URL]
    --token-secret <SECRET>     Secret for signing access tokens [default: $HEMOLINK_TOKEN_SECRET]
    --token-lifetime-days <N>   Access token lifetime in days [default: 7]
    --host <HOST>               Host to bind the HTTP server [default: 127.0.0.1]
    --port <PORT>               Port to bind the HTTP server [default: 8080]
    --cors-origin <ORIGIN>      Allowed CORS origin [default: any origin]
    --verbose                   Enable verbose logging

DESCRIPTION:
    Runs the Hemolink daemon with all coordination endpoints mounted under
    /api/v1/

    The server supports graceful shutdown via SIGTERM or Ctrl+C.

API ENDPOINTS:
    Authentication:
      POST   /api/v1/auth/register              Register and receive a token
      POST   /api/v1/auth/login                 Exchange credentials for a token
      GET    /api/v1/auth/me                    Return the authenticated user

    Blood Requests:
      POST   /api/v1/blood-requests             Post a blood request
      GET    /api/v1/blood-requests             Browse requests with filters
      GET    /api/v1/blood-requests/{id}        Get a single request
      PATCH  /api/v1/blood-requests/{id}/status Update a request's status

    Donor Matching:
      GET    /api/v1/donors/match               Find available donors

    Medical Facilities:
      POST   /api/v1/medical-facilities         Register a facility
      GET    /api/v1/medical-facilities         Browse facilities with filters
      GET    /api/v1/medical-facilities/{id}    Get a single facility

    Donation History:
      POST   /api/v1/donation-history           Record a donation (donors only)
      GET    /api/v1/donation-history           List the caller's donations

    Stats:
      GET    /api/v1/stats                      Platform-wide counters"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: hemolinkd [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let config = match ServerConfig::from_args(args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            std::process::exit(1);
        }
    };

    if config.verbose {
        println!("Hemolink daemon starting with configuration:");
        println!("  Bind address: {}:{}", config.host, config.port);
        println!("  Token lifetime: {} days", config.token_lifetime_days);
    }

    // Connect to PostgreSQL
    let pool = PgPool::connect(&config.database_url)
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;

    if config.verbose {
        println!("Connected to PostgreSQL");
    }

    let auth = AuthConfig::new(config.token_secret.clone())
        .with_token_lifetime(Duration::days(config.token_lifetime_days as i64));
    let state = AppState::new(pool, auth);

    let cors = match &config.cors_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .map_err(|e| format!("Invalid CORS origin {:?}: {}", origin, e))?;
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_origin(origin)
        }
        None => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .allow_origin(Any),
    };

    let app = Router::new()
        .nest("/api/v1", create_auth_router(state.clone()))
        .nest("/api/v1", create_blood_request_router(state.clone()))
        .nest("/api/v1", create_donor_router(state.clone()))
        .nest("/api/v1", create_facility_router(state.clone()))
        .nest("/api/v1", create_donation_router(state.clone()))
        .nest("/api/v1", create_stats_router(state))
        .layer(cors);

    // Bind to address
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("🚀 Hemolink daemon started successfully!");
    println!("📡 Server listening on: http://{}", addr);
    println!("🔄 Ready to accept API requests");
    println!("💡 Use Ctrl+C or send SIGTERM for graceful shutdown");
    println!();

    // Set up graceful shutdown
    let shutdown_signal = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    // Run server with graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                eprintln!("❌ Server error: {}", e);
                std::process::exit(1);
            }
        }
        () = shutdown_signal => {
            println!();
            println!("🛑 Shutdown signal received, stopping server gracefully...");
            println!("👋 Hemolink daemon stopped");
        }
    }

    Ok(())
}

struct ServerConfig {
    database_url: String,
    token_secret: String,
    token_lifetime_days: u16,
    host: String,
    port: u16,
    cors_origin: Option<String>,
    verbose: bool,
}

impl ServerConfig {
    fn from_args(args: Args) -> Result<Self, String> {
        let database_url = args
            .database_url
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .ok_or_else(|| {
                "database URL required: pass --database-url or set DATABASE_URL".to_string()
            })?;
        let token_secret = args
            .token_secret
            .or_else(|| std::env::var("HEMOLINK_TOKEN_SECRET").ok())
            .ok_or_else(|| {
                "token secret required: pass --token-secret or set HEMOLINK_TOKEN_SECRET"
                    .to_string()
            })?;
        Ok(Self {
            database_url,
            token_secret,
            token_lifetime_days: args.token_lifetime_days.unwrap_or(7),
            host: args.host.unwrap_or_else(|| "127.0.0.1".to_string()),
            port: args.port.unwrap_or(8080),
            cors_origin: args.cors_origin,
            verbose: args.verbose,
        })
    }
}
