mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
    net::TcpListener,
    sync::{broadcast, mpsc},
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    app::{App, AppEvent, Controller, Crop, Timings, ViewState},
    config::AppConfig,
    geodata::{GeoDataLoader, GeoPoint},
    rng::RngManager,
};

const EVENT_QUEUE_DEPTH: usize = 256;

/// Leaflet viewport, sent to the client with every state request.
#[derive(Debug, Clone, Serialize)]
pub struct MapSettings {
    pub center: [f64; 2],
    pub zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub max_bounds: [[f64; 2]; 2],
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: [20.0, 0.0],
            zoom: 2,
            min_zoom: 2,
            max_zoom: 8,
            max_bounds: [[-85.0, -180.0], [85.0, 180.0]],
        }
    }
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub map: MapSettings,
    pub crops: Vec<CropOption>,
    pub frame: Option<ViewState>,
}

#[derive(Clone, Serialize)]
pub struct CropOption {
    pub value: Crop,
    pub label: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("controller is not running")]
    ControllerUnavailable,
    #[error("geodata is not loaded yet")]
    GeoDataUnavailable,
    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::ControllerUnavailable | ApiError::GeoDataUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Shared between HTTP handlers. The application state itself lives in the
/// controller task; handlers only enqueue events and read published frames.
pub struct AppState {
    events: mpsc::Sender<AppEvent>,
    broadcaster: broadcast::Sender<String>,
    latest_frame: Mutex<Option<ViewState>>,
    overlay: Mutex<Option<Bytes>>,
    map: MapSettings,
}

impl AppState {
    pub fn new(events: mpsc::Sender<AppEvent>) -> Self {
        let (broadcaster, _) = broadcast::channel::<String>(512);
        Self {
            events,
            broadcaster,
            latest_frame: Mutex::new(None),
            overlay: Mutex::new(None),
            map: MapSettings::default(),
        }
    }

    pub fn publish(&self, frame: &ViewState) {
        if let Ok(mut guard) = self.latest_frame.lock() {
            *guard = Some(frame.clone());
        }
        match serde_json::to_string(frame) {
            Ok(payload) => {
                let _ = self.broadcaster.send(payload);
            }
            Err(err) => error!(error = %err, "failed to encode frame"),
        }
    }

    pub fn set_overlay(&self, geojson: Bytes) {
        if let Ok(mut guard) = self.overlay.lock() {
            *guard = Some(geojson);
        }
    }

    pub fn latest_frame(&self) -> Option<ViewState> {
        self.latest_frame.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.broadcaster.subscribe()
    }

    async fn dispatch(&self, event: AppEvent) -> Result<StatusCode, ApiError> {
        self.events
            .send(event)
            .await
            .map_err(|_| ApiError::ControllerUnavailable)?;
        Ok(StatusCode::ACCEPTED)
    }
}

pub struct WebServerConfig {
    pub config: AppConfig,
}

pub async fn run(server: WebServerConfig) -> Result<()> {
    let WebServerConfig { config } = server;

    let mut rngs = match config.simulation.seed {
        Some(seed) => RngManager::new(seed),
        None => RngManager::from_entropy(),
    };
    info!(seed = rngs.seed(), "simulation rng seeded");
    let app = App::new(
        rngs.next_stream(),
        Timings::from_config(&config),
        config.ui.log_capacity,
    );

    let (tx, rx) = mpsc::channel::<AppEvent>(EVENT_QUEUE_DEPTH);
    let state = Arc::new(AppState::new(tx.clone()));

    let publisher = state.clone();
    let controller = Controller::new(app, &tx, rx, move |frame: &ViewState| {
        publisher.publish(frame)
    });
    tokio::spawn(controller.run());

    let loader = GeoDataLoader::new(config.geodata.source(), config.geodata.timeout());
    let overlay_state = state.clone();
    tokio::spawn(async move {
        let result = loader.load().await.map(Arc::new);
        if let Ok(collection) = &result {
            overlay_state.set_overlay(collection.raw_geojson());
        }
        if tx.send(AppEvent::GeoDataLoaded(result)).await.is_err() {
            warn!("controller stopped before geodata arrived");
        }
    });

    let router = router(state);
    let host = &config.server.host;
    let port = config.server.port;
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("agromap UI live at http://{addr} (Ctrl+C to stop)");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/:name", get(static_asset))
        .route("/api/state", get(latest_state))
        .route("/api/events", get(stream_events))
        .route("/api/countries", get(countries))
        .route("/api/click", post(click))
        .route("/api/inputs", post(inputs))
        .route("/api/simulate", post(simulate))
        .route("/api/reset", post(reset))
        .with_state(state)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web UI");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX.body)
}

async fn static_asset(Path(name): Path<String>) -> Response {
    match assets::lookup(&name) {
        Some(asset) => ([(header::CONTENT_TYPE, asset.content_type)], asset.body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    Json(StateEnvelope {
        map: state.map.clone(),
        crops: Crop::ALL
            .into_iter()
            .map(|crop| CropOption {
                value: crop,
                label: crop.label(),
            })
            .collect(),
        frame: state.latest_frame(),
    })
}

async fn countries(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let overlay = state
        .overlay
        .lock()
        .ok()
        .and_then(|guard| guard.clone())
        .ok_or(ApiError::GeoDataUnavailable)?;
    Ok((
        [(header::CONTENT_TYPE, "application/geo+json")],
        overlay,
    )
        .into_response())
}

/// JSON body extractor whose rejections are reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub lat: f64,
    pub lng: f64,
}

async fn click(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ClickRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .dispatch(AppEvent::MapClicked(GeoPoint::new(request.lng, request.lat)))
        .await
}

#[derive(Debug, Default, Deserialize)]
pub struct InputsRequest {
    pub irrigation: Option<f64>,
    pub fertilizer: Option<f64>,
    pub crop: Option<Crop>,
}

async fn inputs(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<InputsRequest>,
) -> Result<StatusCode, ApiError> {
    if let Some(value) = request.irrigation {
        state.dispatch(AppEvent::IrrigationChanged(value)).await?;
    }
    if let Some(value) = request.fertilizer {
        state.dispatch(AppEvent::FertilizerChanged(value)).await?;
    }
    if let Some(crop) = request.crop {
        state.dispatch(AppEvent::CropChanged(crop)).await?;
    }
    Ok(StatusCode::ACCEPTED)
}

async fn simulate(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.dispatch(AppEvent::RunSimulation).await
}

async fn reset(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.dispatch(AppEvent::Reset).await
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
