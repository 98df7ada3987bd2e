use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{debug, info};

use crate::aggregation;
use crate::scale::AxisScale;
use crate::store::{DatasetStore, LoadState, StoreSnapshot, Subscription};
use crate::types::{CountrySummary, LineSeries, PieSlice};

/// Shared application state
pub struct AppState {
    pub store: DatasetStore,
}

/// Response for the load status
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: LoadState,
    pub generation: u64,
    #[serde(rename = "loadedAt")]
    pub loaded_at: Option<DateTime<Utc>>,
    pub countries: usize,
}

/// Home view: pie chart plus header counts
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub state: LoadState,
    #[serde(rename = "countryCount")]
    pub country_count: usize,
    #[serde(rename = "eventCount")]
    pub event_count: usize,
    pub pie: Vec<PieSlice>,
}

impl HomeResponse {
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let dataset = snapshot.dataset();
        Self {
            state: snapshot.state().clone(),
            country_count: aggregation::country_count(dataset),
            event_count: aggregation::distinct_years(dataset),
            pie: aggregation::pie_series_for(dataset),
        }
    }
}

/// Detail view: one country's figures, medal trend and its Y axis
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub state: LoadState,
    pub summary: CountrySummary,
    pub series: LineSeries,
    pub axis: Option<AxisScale>,
}

impl DetailResponse {
    /// `None` when the country is not in the snapshot's dataset
    pub fn from_snapshot(snapshot: &StoreSnapshot, country: &str) -> Option<Self> {
        let dataset = snapshot.dataset();
        let summary = aggregation::country_summary(dataset, country)?;
        let series = aggregation::line_series_for(dataset, country)?;
        let axis = AxisScale::from_values(&series.values());
        Some(Self {
            state: snapshot.state().clone(),
            summary,
            series,
            axis,
        })
    }
}

/// Build the HTTP router. Static files, when configured, are served for
/// every path the API does not claim.
pub fn router(store: DatasetStore, static_dir: Option<&std::path::Path>) -> Router {
    let state = Arc::new(AppState { store });

    let app = Router::new()
        .route("/api/state", get(get_state))
        .route("/api/home", get(get_home))
        .route("/api/countries/{name}", get(get_country))
        .route("/api/reload", post(reload))
        .route("/ws", get(ws_handler));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(CorsLayer::new().allow_origin(Any)).with_state(state)
}

/// GET /api/state - Load status
pub async fn get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().peek();
    Json(StateResponse {
        state: snapshot.state().clone(),
        generation: snapshot.generation(),
        loaded_at: snapshot.loaded_at(),
        countries: snapshot.dataset().len(),
    })
}

/// GET /api/home - Pie chart and counts
pub async fn get_home(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.snapshot().peek();
    Json(HomeResponse::from_snapshot(&snapshot))
}

/// GET /api/countries/{name} - Country detail, 404 when unknown
pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let snapshot = state.store.snapshot().peek();

    match DetailResponse::from_snapshot(&snapshot, &name) {
        Some(detail) => (StatusCode::OK, Json(serde_json::json!(detail))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("country not found: {}", name),
                "state": snapshot.state(),
            })),
        ),
    }
}

/// POST /api/reload - Trigger a new load
pub async fn reload(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.load();
    StatusCode::ACCEPTED
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Push the home view now and after every store update
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    info!("WebSocket client connected");
    serve_client(sender, receiver, state.store.snapshot()).await;
    info!("WebSocket client disconnected");
}

/// Drive one push client until either side ends.
///
/// Both loops run in this task; whichever finishes first drops the other,
/// releasing the subscription with it.
async fn serve_client<W, R, E>(
    mut sender: W,
    mut receiver: R,
    mut snapshots: Subscription<StoreSnapshot>,
) where
    W: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
{
    let push = async move {
        let mut snapshot = Some(snapshots.current());
        while let Some(current) = snapshot {
            if let Ok(json) = serde_json::to_string(&HomeResponse::from_snapshot(&current)) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            snapshot = snapshots.changed().await;
        }
    };

    let listen = async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
            debug!("Ignoring client message");
        }
    };

    tokio::select! {
        _ = push => {},
        _ = listen => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{FetchError, StaticLoader};
    use crate::types::{CountryRecord, ParticipationRecord};
    use futures::channel::mpsc;

    async fn loaded_state(loader: StaticLoader) -> State<Arc<AppState>> {
        let store = DatasetStore::new(Arc::new(loader));
        let mut load_state = store.load_state();
        store.load();
        load_state.wait_for(LoadState::is_settled).await.unwrap();
        State(Arc::new(AppState { store }))
    }

    fn sample() -> Vec<CountryRecord> {
        vec![CountryRecord {
            id: 1,
            country: "Germany".to_string(),
            participations: vec![
                ParticipationRecord::new(2012, 425, 44),
                ParticipationRecord::new(2016, 422, 44),
                ParticipationRecord::new(2020, 425, 37),
            ],
        }]
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_home() {
        let state = loaded_state(StaticLoader::new(sample())).await;
        let response = get_home(state).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["state"]["status"], "ready");
        assert_eq!(json["countryCount"], 1);
        assert_eq!(json["eventCount"], 3);
        assert_eq!(json["pie"][0], serde_json::json!({"name": "Germany", "value": 125}));
    }

    #[tokio::test]
    async fn test_country_detail() {
        let state = loaded_state(StaticLoader::new(sample())).await;
        let response = get_country(state, Path("germany".to_string())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["summary"]["totalMedals"], 125);
        assert_eq!(json["summary"]["entries"], 3);
        assert_eq!(json["series"]["series"][2], serde_json::json!({"name": "2020", "value": 37}));
        assert_eq!(json["axis"]["min"], 30);
        assert_eq!(json["axis"]["max"], 50);
        assert_eq!(json["axis"]["ticks"], serde_json::json!([30, 35, 40, 45, 50]));
    }

    #[tokio::test]
    async fn test_unknown_country_is_not_found() {
        let state = loaded_state(StaticLoader::new(sample())).await;
        let response = get_country(state, Path("atlantis".to_string())).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_load_reports_reason() {
        let state = loaded_state(StaticLoader::failing(FetchError::Transport("timeout".to_string()))).await;

        let json = body_json(get_state(state.clone()).await.into_response()).await;
        assert_eq!(json["state"]["status"], "failed");
        assert_eq!(json["state"]["reason"], "transport error: timeout");
        assert_eq!(json["countries"], 0);
        assert_eq!(json["generation"], 1);

        let json = body_json(get_home(state).await.into_response()).await;
        assert_eq!(json["pie"], serde_json::json!([]));
        assert_eq!(json["eventCount"], 0);
    }

    #[tokio::test]
    async fn test_client_close_releases_subscription() {
        let State(state) = loaded_state(StaticLoader::new(sample())).await;
        let (out_tx, mut out_rx) = mpsc::unbounded::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();

        let client = tokio::spawn(serve_client(out_tx, in_rx, state.store.snapshot()));

        let Some(Message::Text(text)) = out_rx.next().await else {
            panic!("expected the home view first");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["countryCount"], 1);
        assert_eq!(state.store.subscriber_count(), 1);

        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();
        client.await.unwrap();

        assert_eq!(state.store.subscriber_count(), 0);
        // The outgoing half was dropped along with the push loop
        assert_eq!(out_rx.next().await, None);
    }

    #[tokio::test]
    async fn test_gone_client_stops_listening() {
        let State(state) = loaded_state(StaticLoader::new(sample())).await;
        let (out_tx, mut out_rx) = mpsc::unbounded::<Message>();
        let (_in_tx, in_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();

        let client = tokio::spawn(serve_client(out_tx, in_rx, state.store.snapshot()));
        assert!(out_rx.next().await.is_some());

        // Next push fails; the listen loop must not outlive it
        drop(out_rx);
        state.store.load();
        client.await.unwrap();

        assert_eq!(state.store.subscriber_count(), 0);
    }
}
