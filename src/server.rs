//! HTTP 接口 - 查询可用性、手动触发检测

use crate::detector::Outcome;
use crate::error::MonitorError;
use crate::monitor::{MonitorService, MonitorState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// `GET /check-tickets` 响应
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// `POST /check-now` 响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckNowResponse {
    pub available: bool,
    pub outcome: Option<Outcome>,
    pub consecutive_failures: u32,
}

impl From<&MonitorState> for CheckNowResponse {
    fn from(state: &MonitorState) -> Self {
        Self {
            available: state.last_confirmed.is_available(),
            outcome: state.last_outcome,
            consecutive_failures: state.consecutive_failures,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// 接口错误
pub struct ApiError(MonitorError);

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            MonitorError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// 构建路由
pub fn router(service: Arc<MonitorService>) -> Router {
    Router::new()
        .route("/check-tickets", get(check_tickets))
        .route("/check-now", post(check_now))
        .route("/status", get(status))
        .with_state(service)
}

/// 在 listener 上提供服务，`shutdown` 完成后优雅退出
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<MonitorService>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn check_tickets(State(service): State<Arc<MonitorService>>) -> Json<AvailabilityResponse> {
    Json(AvailabilityResponse {
        available: service.current_state().last_confirmed.is_available(),
    })
}

async fn check_now(
    State(service): State<Arc<MonitorService>>,
) -> Result<Json<CheckNowResponse>, ApiError> {
    let state = service.check_now().await.map_err(|e| {
        warn!(error = %e, "Manual check rejected");
        e
    })?;
    Ok(Json(CheckNowResponse::from(&state)))
}

async fn status(State(service): State<Arc<MonitorService>>) -> Json<MonitorState> {
    Json(service.current_state())
}
