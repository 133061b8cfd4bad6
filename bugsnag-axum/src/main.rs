use axum::{
    extract::Path,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use bugsnag_axum::{init_tracing, report_errors, ApiError, ApiResult, ReportState, Reported};
use bugsnag_core::{BreadcrumbTrail, BreadcrumbType, BugsnagConfig, OpaqueError};
use bugsnag_notifier::Reporter;
use clap::Parser;
use serde_json::{json, Value};
use std::{collections::BTreeMap, net::SocketAddr, path::PathBuf};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Demo server that reports failing requests to Bugsnag
#[derive(Parser, Debug)]
#[command(name = "bugsnag-demo")]
#[command(about = "Axum server wired to the Bugsnag error reporter")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Configuration file path; BUGSNAG_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Largest request body captured into reports, in bytes
    #[arg(long, default_value_t = bugsnag_axum::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let config = BugsnagConfig::load(args.config.as_deref())?;
    let reporter = Reporter::new(&config)?;
    info!(
        endpoint = %config.endpoint,
        release_stage = %config.release_stage,
        "Bugsnag reporter ready"
    );

    let state = ReportState::new(reporter).with_max_body_bytes(args.max_body_bytes);
    let app = Router::new()
        .route("/health", get(health))
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order).delete(cancel_order))
        .route("/crash", get(crash))
        .route("/unavailable", get(unavailable))
        .layer(from_fn_with_state(state, report_errors))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Demo server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_order(
    Extension(trail): Extension<BreadcrumbTrail>,
    Json(order): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let fields = order.as_object().map_or(0, serde_json::Map::len);
    trail.leave_with(
        "Order received",
        BreadcrumbType::State,
        BTreeMap::from([("fields".to_string(), fields.to_string())]),
    );

    if let Some(id) = order.get("id") {
        return Err(ApiError::conflict(format!("order {id} already exists")));
    }

    let Some(quantity) = order.get("quantity").and_then(Value::as_u64) else {
        return Err(ApiError::validation("quantity is required"));
    };
    if quantity == 0 {
        return Err(ApiError::bad_request("quantity must be positive"));
    }

    Ok((StatusCode::CREATED, Json(json!({ "quantity": quantity }))))
}

async fn get_order(Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    Err(ApiError::not_found(format!("order {id}")))
}

async fn cancel_order(Path(id): Path<u64>) -> ApiResult<StatusCode> {
    Err(ApiError::authorization(format!("order {id} can only be cancelled by its owner")))
}

async fn crash() -> Result<&'static str, Reported<OpaqueError>> {
    Err(anyhow::anyhow!("inventory service returned garbage").into())
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}
