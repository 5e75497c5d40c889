use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use smartcast::PowerState;
use smartcast::RemoteKey;

use crate::config::Config;
use crate::device::SharedTv;
use crate::device::SmartCastConnector;
use crate::device::TvControl;
use crate::device::TvError;

/// Shared application state: the env-derived device config and the
/// lazily-initialized device handle
pub struct AppState {
    pub config: Config,
    pub tv: SharedTv,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tv: SharedTv::new(Arc::new(SmartCastConnector)),
        }
    }
}

/// Error surface of the API.
///
/// Validation failures become 400s before the device is contacted; anything
/// raised by the adapter becomes a 500 carrying the underlying message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<TvError> for ApiError {
    fn from(err: TvError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<smartcast::Error> for ApiError {
    fn from(err: smartcast::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

async fn tv(state: &AppState) -> Result<Arc<dyn TvControl>, ApiError> {
    Ok(state.tv.get(&state.config).await?)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    tv_connected: bool,
    tv_ip: Option<String>,
    tv_port: u16,
    auth_token_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Handler for GET /health. Never fails the HTTP transaction: a device
/// that cannot be initialized degrades to an "unhealthy" body.
#[tracing::instrument(skip(state))]
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, tv_connected, error) = match state.tv.get(&state.config).await {
        Ok(_) => ("healthy", true, None),
        Err(err) => {
            tracing::error!(error = %err, "health check failed");
            ("unhealthy", false, Some(err.to_string()))
        }
    };

    Json(HealthResponse {
        status,
        tv_connected,
        tv_ip: state.config.tv_ip.clone(),
        tv_port: state.config.tv_port,
        auth_token_set: state.config.auth_token_set(),
        error,
    })
}

#[derive(Serialize)]
struct InfoResponse {
    ip: Option<String>,
    port: u16,
    auth_token_set: bool,
    power: String,
    power_mode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    power_error: Option<String>,
    volume: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume_error: Option<String>,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_error: Option<String>,
    muted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mute_error: Option<String>,
}

/// Handler for GET /tv/info. Each sub-query fails independently: a failing
/// field is reported with a safe default plus its own diagnostic instead of
/// failing the whole response.
#[tracing::instrument(skip(state))]
async fn tv_info(State(state): State<Arc<AppState>>) -> Result<Json<InfoResponse>, ApiError> {
    let tv = tv(&state).await?;

    let mut info = InfoResponse {
        ip: state.config.tv_ip.clone(),
        port: state.config.tv_port,
        auth_token_set: state.config.auth_token_set(),
        power: PowerState::Unknown.to_string(),
        power_mode: None,
        power_error: None,
        volume: 0,
        volume_error: None,
        input: "Unknown".to_string(),
        input_error: None,
        muted: false,
        mute_error: None,
    };

    match tv.power_state().await {
        Ok(code) => {
            info.power = PowerState::from_code(Some(code)).to_string();
            info.power_mode = Some(code);
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to get power state");
            info.power_error = Some(err.to_string());
        }
    }

    match tv.current_volume().await {
        Ok(volume) => info.volume = volume.unwrap_or(0),
        Err(err) => {
            tracing::error!(error = %err, "failed to get volume");
            info.volume_error = Some(err.to_string());
        }
    }

    match tv.current_input().await {
        Ok(Some(input)) => info.input = input,
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "failed to get input");
            info.input_error = Some(err.to_string());
        }
    }

    match tv.is_muted().await {
        Ok(muted) => info.muted = muted.unwrap_or(false),
        Err(err) => {
            tracing::error!(error = %err, "failed to get mute state");
            info.mute_error = Some(err.to_string());
        }
    }

    Ok(Json(info))
}

#[derive(Debug, Deserialize)]
struct PowerRequest {
    power: String,
}

/// Handler for POST /tv/power
#[tracing::instrument(skip(state))]
async fn set_power(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PowerRequest>,
) -> Result<Json<Value>, ApiError> {
    let power = request.power.to_lowercase();
    let message = match power.as_str() {
        "on" => {
            tv(&state).await?.power_on().await?;
            "TV powered on"
        }
        "off" => {
            tv(&state).await?.power_off().await?;
            "TV powered off"
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Power must be 'on' or 'off'".to_string(),
            ))
        }
    };

    tracing::info!(power, "power command completed");
    Ok(Json(json!({ "message": message, "power": power })))
}

/// Handler for GET /tv/power.
///
/// The one endpoint with a special-cased error translation: an adapter
/// failure whose text matches the empty-auth-token condition turns into
/// pairing guidance rather than a 500. Matching on the error text is
/// fragile but it is all the device protocol gives us.
#[tracing::instrument(skip(state))]
async fn get_power(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match tv(&state).await?.power_state().await {
        Ok(code) => Ok(Json(json!({ "power": code }))),
        Err(err) if err.to_string().contains("Empty auth token") => {
            tracing::error!(error = %err, "failed to get power state");
            Ok(Json(json!({
                "error": "Authentication required. Pair with the TV and set VIZIO_AUTH_TOKEN.",
                "power": "unknown",
            })))
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Deserialize)]
struct VolumeRequest {
    volume: i64,
}

/// Handler for POST /tv/volume.
///
/// The requested volume is clamped to the device's live maximum before
/// anything is sent. Some firmwares reject absolute volume writes, so a
/// rejected direct set falls back to stepping the difference between target
/// and current volume. The resulting volume is re-queried and returned
/// either way.
#[tracing::instrument(skip(state))]
async fn set_volume(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VolumeRequest>,
) -> Result<Json<Value>, ApiError> {
    let tv = tv(&state).await?;
    let max_volume = tv.max_volume().await?;
    let target = request.volume.clamp(0, i64::from(max_volume)) as u32;

    let accepted = tv.set_audio_setting("volume", target).await?;
    if !accepted {
        let current = tv
            .current_volume()
            .await?
            .ok_or_else(|| ApiError::Internal("Could not get current volume".to_string()))?;

        let diff = i64::from(target) - i64::from(current);
        if diff > 0 {
            tv.volume_up(diff as u32).await?;
        } else if diff < 0 {
            tv.volume_down(diff.unsigned_abs() as u32).await?;
        }
    }

    let new_volume = tv
        .current_volume()
        .await?
        .ok_or_else(|| ApiError::Internal("Failed to verify new volume".to_string()))?;

    Ok(Json(json!({
        "message": format!("Volume set to {new_volume}"),
        "volume": new_volume,
    })))
}

/// Handler for GET /tv/volume
#[tracing::instrument(skip(state))]
async fn get_volume(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let volume = tv(&state).await?.current_volume().await?;
    Ok(Json(json!({ "volume": volume.unwrap_or(0) })))
}

#[derive(Debug, Deserialize)]
struct InputRequest {
    input_name: String,
}

/// Handler for POST /tv/input. No local whitelist: the device enforces
/// which input names exist.
#[tracing::instrument(skip(state))]
async fn set_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InputRequest>,
) -> Result<Json<Value>, ApiError> {
    tv(&state).await?.set_input(&request.input_name).await?;
    Ok(Json(json!({
        "message": format!("Input set to {}", request.input_name),
        "input": request.input_name,
    })))
}

/// Handler for GET /tv/input
#[tracing::instrument(skip(state))]
async fn get_input(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let input = tv(&state).await?.current_input().await?;
    Ok(Json(
        json!({ "input": input.unwrap_or_else(|| "Unknown".to_string()) }),
    ))
}

/// Handler for GET /tv/inputs
#[tracing::instrument(skip(state))]
async fn list_inputs(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let inputs = tv(&state).await?.list_inputs().await?;
    Ok(Json(json!({ "inputs": inputs })))
}

#[derive(Debug, Deserialize)]
struct AppRequest {
    app_name: String,
}

/// Handler for POST /tv/app
#[tracing::instrument(skip(state))]
async fn launch_app(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AppRequest>,
) -> Result<Json<Value>, ApiError> {
    tv(&state).await?.launch_app(&request.app_name).await?;
    Ok(Json(json!({
        "message": format!("App {} launched", request.app_name),
        "app": request.app_name,
    })))
}

/// Handler for GET /tv/apps
#[tracing::instrument(skip(state))]
async fn list_apps(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let apps = tv(&state).await?.list_apps().await?;
    Ok(Json(json!({ "apps": apps })))
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct MuteQuery {
    #[serde(default = "default_true")]
    muted: bool,
}

/// Handler for POST /tv/mute; `muted` query parameter defaults to true
#[tracing::instrument(skip(state))]
async fn set_mute(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MuteQuery>,
) -> Result<Json<Value>, ApiError> {
    let tv = tv(&state).await?;
    let message = if query.muted {
        tv.mute_on().await?;
        "TV muted"
    } else {
        tv.mute_off().await?;
        "TV unmuted"
    };
    Ok(Json(json!({ "message": message, "muted": query.muted })))
}

/// Handler for GET /tv/mute
#[tracing::instrument(skip(state))]
async fn get_mute(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let muted = tv(&state).await?.is_muted().await?;
    Ok(Json(json!({ "muted": muted.unwrap_or(false) })))
}

#[derive(Debug, Deserialize)]
struct RemoteKeyRequest {
    key: String,
}

/// Handler for POST /tv/remote. Unknown keys are rejected before the
/// device is contacted.
#[tracing::instrument(skip(state))]
async fn send_remote_key(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RemoteKeyRequest>,
) -> Result<Json<Value>, ApiError> {
    let key = RemoteKey::from_str(&request.key).map_err(|_| {
        ApiError::BadRequest("Key must be one of UP, DOWN, LEFT, RIGHT, OK".to_string())
    })?;

    tv(&state).await?.send_key(key).await?;
    Ok(Json(json!({
        "message": format!("Key '{key}' sent"),
        "key": key.to_string(),
    })))
}

/// Create the API router with all endpoints.
///
/// Static UI assets are mounted after the API routes so they cannot shadow
/// them.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tv/info", get(tv_info))
        .route("/tv/power", post(set_power).get(get_power))
        .route("/tv/volume", post(set_volume).get(get_volume))
        .route("/tv/input", post(set_input).get(get_input))
        .route("/tv/inputs", get(list_inputs))
        .route("/tv/app", post(launch_app))
        .route("/tv/apps", get(list_apps))
        .route("/tv/mute", post(set_mute).get(get_mute))
        .route("/tv/remote", post(send_remote_key))
        .route_service("/", ServeFile::new("static/index.html"))
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server.
///
/// Binds the listen address and serves until the shutdown signal fires.
pub async fn serve(
    listen: String,
    port: u16,
    state: Arc<AppState>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let app = router(state);

    let addr: SocketAddr = format!("{listen}:{port}").parse()?;
    tracing::info!("Starting HTTP API server on {addr}");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
            tracing::info!("HTTP API server shutting down gracefully");
        })
        .await?;

    Ok(())
}
