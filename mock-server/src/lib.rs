use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use hyper::ext::ReasonPhrase;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct NewStation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct StationPatch {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub q: Option<String>,
    pub units: Option<String>,
}

/// Optional reason phrase for `/status/{code}`.
#[derive(Deserialize)]
pub struct StatusQuery {
    pub reason: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Station>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/weather", get(current_weather))
        .route("/stations", get(list_stations).post(create_station))
        .route(
            "/stations/{id}",
            get(get_station)
                .put(replace_station)
                .patch(patch_station)
                .delete(delete_station),
        )
        .route("/status/{code}", any(status_code))
        .route("/echo/headers", any(echo_headers))
        .route("/empty", any(empty))
        .route("/malformed", get(malformed))
        .route("/slow", any(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Fixed readings in the shape of the OpenWeatherMap `weather` endpoint.
async fn current_weather(Query(query): Query<WeatherQuery>) -> (StatusCode, Json<Value>) {
    let Some(city) = query.q else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"cod": "400", "message": "Nothing to geocode"})),
        );
    };
    let (celsius, description) = match city.to_ascii_lowercase().as_str() {
        "london" => (11.0, "light rain"),
        "madrid" => (24.5, "clear sky"),
        "oslo" => (-3.0, "snow"),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"cod": "404", "message": "city not found"})),
            )
        }
    };
    let temp = match query.units.as_deref() {
        Some("imperial") => celsius * 9.0 / 5.0 + 32.0,
        Some("metric") => celsius,
        _ => celsius + 273.15,
    };
    (
        StatusCode::OK,
        Json(json!({
            "name": city,
            "main": {"temp": temp},
            "weather": [{"main": "Weather", "description": description}],
        })),
    )
}

async fn list_stations(State(db): State<Db>) -> Json<Vec<Station>> {
    let stations = db.read().await;
    Json(stations.values().cloned().collect())
}

async fn create_station(
    State(db): State<Db>,
    Json(input): Json<NewStation>,
) -> (StatusCode, Json<Station>) {
    let station = Station {
        id: Uuid::new_v4(),
        name: input.name,
        latitude: input.latitude,
        longitude: input.longitude,
    };
    db.write().await.insert(station.id, station.clone());
    (StatusCode::CREATED, Json(station))
}

async fn get_station(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<Station>, StatusCode> {
    let stations = db.read().await;
    stations.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_station(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewStation>,
) -> Result<Json<Station>, StatusCode> {
    let mut stations = db.write().await;
    let station = stations.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    station.name = input.name;
    station.latitude = input.latitude;
    station.longitude = input.longitude;
    Ok(Json(station.clone()))
}

async fn patch_station(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<StationPatch>,
) -> Result<Json<Station>, StatusCode> {
    let mut stations = db.write().await;
    let station = stations.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        station.name = name;
    }
    if let Some(latitude) = input.latitude {
        station.latitude = latitude;
    }
    if let Some(longitude) = input.longitude {
        station.longitude = longitude;
    }
    Ok(Json(station.clone()))
}

async fn delete_station(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut stations = db.write().await;
    stations.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

/// Reply with the requested status and a short text body.
async fn status_code(Path(code): Path<u16>, Query(query): Query<StatusQuery>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return (StatusCode::BAD_REQUEST, format!("invalid status {code}")).into_response();
    };
    let mut response = (status, format!("status {code}")).into_response();
    if let Some(reason) = query.reason.and_then(|reason| ReasonPhrase::try_from(reason).ok()) {
        response.extensions_mut().insert(reason);
    }
    response
}

/// Request headers as a JSON object, lower-cased names, last value wins.
async fn echo_headers(headers: HeaderMap) -> Json<HashMap<String, String>> {
    let echoed = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(echoed)
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn malformed() -> (StatusCode, [(&'static str, &'static str); 1], &'static str) {
    (StatusCode::OK, [("content-type", "application/json")], "{\"name\": ")
}

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "finally"
}
