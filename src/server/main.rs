//! HTTP server for single-address geocoding.
//!
//! Exposes the resolver and the country directory as a small JSON API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use alder::countries::{list_countries, GLOBAL_CODE, GLOBAL_LABEL};
use alder::report::{Collector, Diagnostic};
use alder::{Config, CountryScope, Credentials, GeocodeResult, Resolver};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Geocoding HTTP server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Application state shared across handlers
struct AppState {
    resolver: Resolver,
    credentials: Option<Credentials>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Alder Geocoding Server");

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let credentials = config.credentials();
    if credentials.is_none() {
        info!("No Google Maps API key configured; using Nominatim unless a key is passed per request");
    }

    let state = Arc::new(AppState {
        resolver: config.build_resolver()?,
        credentials,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/countries", get(countries_handler))
        .route("/v1/geocode", get(geocode_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        primary_configured: state.credentials.is_some(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    primary_configured: bool,
}

/// Country filter options, "no filter" first
async fn countries_handler() -> Json<Vec<CountryOption>> {
    let mut options = vec![CountryOption {
        code: GLOBAL_CODE,
        name: GLOBAL_LABEL,
    }];
    options.extend(list_countries().into_iter().map(|c| CountryOption {
        code: c.code,
        name: c.name,
    }));
    Json(options)
}

#[derive(Serialize)]
struct CountryOption {
    code: &'static str,
    name: &'static str,
}

/// Error body: a message plus any diagnostics raised while resolving
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    warnings: Vec<Diagnostic>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, warnings: Vec<Diagnostic>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            warnings,
        }),
    )
}

/// Forward geocoding of a single address
async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQueryParams>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    if params.text.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "text must not be empty",
            Vec::new(),
        ));
    }

    let scope = CountryScope::from_code(params.country.as_deref().unwrap_or(GLOBAL_CODE))
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string(), Vec::new()))?;

    let credentials = params
        .key
        .and_then(Credentials::new)
        .or_else(|| state.credentials.clone());

    let collector = Arc::new(Collector::new());
    let resolver = state.resolver.clone().with_reporter(collector.clone());

    match resolver
        .resolve(&params.text, &scope, credentials.as_ref())
        .await
    {
        Some(result) => Ok(Json(GeocodeResponse {
            result,
            warnings: collector.drain(),
        })),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            "Could not find location. Please try a different address.",
            collector.drain(),
        )),
    }
}

#[derive(Deserialize)]
struct GeocodeQueryParams {
    /// Address text
    text: String,
    /// Country code or GLOBAL
    country: Option<String>,
    /// Google Maps API key for this request
    key: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeocodeResponse {
    #[serde(flatten)]
    result: GeocodeResult,
    warnings: Vec<Diagnostic>,
}
