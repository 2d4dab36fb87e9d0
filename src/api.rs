use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::models::HolderRecord;
use crate::report::Report;

#[derive(Deserialize)]
pub struct HolderQuery {
    pub address: String,
}

pub fn router(report: Arc<Report>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Holder monitor API running" }))
        .route("/report", get(get_report))
        .route("/holder", get(get_holder))
        .layer(cors)
        .with_state(report)
}

/// Serve the finished report until the listener fails
pub async fn serve(cfg: &Config, report: Arc<Report>) -> eyre::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], cfg.port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(report).into_make_service()).await?;

    Ok(())
}

async fn get_report(State(report): State<Arc<Report>>) -> Json<Report> {
    Json(report.as_ref().clone())
}

async fn get_holder(
    State(report): State<Arc<Report>>,
    Query(q): Query<HolderQuery>,
) -> Json<Option<HolderRecord>> {
    Json(report.holder(&q.address).cloned())
}
