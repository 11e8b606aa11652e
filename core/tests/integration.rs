//! End-to-end tests of `RestClient` over real HTTP against the mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port so the station store
//! starts empty and tests can run in parallel.

use std::collections::HashMap;
use std::time::Duration;

use rest_core::{CancellationToken, ClientConfig, RestClient, RestError, RestClientFactory, ReqwestTransport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Weather {
    name: String,
    main: Main,
    weather: Vec<Conditions>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Conditions {
    description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Station {
    id: Uuid,
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
struct NewStation<'a> {
    name: &'a str,
    latitude: f64,
    longitude: f64,
}

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

async fn client() -> RestClient {
    RestClient::new(&start_server().await).unwrap()
}

#[tokio::test]
async fn get_weather_decodes_payload() {
    let client = client().await;

    let response = client
        .get::<Weather>("weather?q=Madrid&units=metric")
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.reason_phrase(), "OK");
    assert_eq!(response.response.header("content-type"), Some("application/json"));
    let weather = response.data.unwrap();
    assert_eq!(weather.name, "Madrid");
    assert_eq!(weather.main.temp, 24.5);
    assert_eq!(weather.weather[0].description, "clear sky");
}

#[tokio::test]
async fn get_unknown_city_is_not_an_error() {
    let client = client().await;
    let response = client.get::<Weather>("weather?q=Atlantis").await.unwrap();
    assert!(!response.is_success());
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.reason_phrase(), "Not Found");
    assert!(response.data.is_none());
}

#[tokio::test]
async fn get_empty_body_has_no_data() {
    let client = client().await;
    let response = client.get::<Weather>("empty").await.unwrap();
    assert!(response.is_success());
    assert!(response.data.is_none());
}

#[tokio::test]
async fn get_malformed_json_fails() {
    let client = client().await;
    let err = client.get::<Weather>("malformed").await.unwrap_err();
    assert!(matches!(err, RestError::DeserializationError(_)));
}

#[tokio::test]
async fn get_string_on_500_carries_reason_and_body() {
    let client = client().await;
    let err = client.get_string("status/500").await.unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, RestError::HttpError { status: 500, .. }));
    assert!(msg.contains("Internal Server Error"), "{msg}");
    assert!(msg.contains("status 500"), "{msg}");
}

#[tokio::test]
async fn server_reason_phrase_is_surfaced() {
    let client = client().await;

    let status = client
        .get_status("status/503?reason=Station%20Offline")
        .await
        .unwrap();
    assert_eq!(status.status_code, 503);
    assert_eq!(status.reason_phrase, "Station Offline");

    let err = client
        .get_string("status/503?reason=Station%20Offline")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Station Offline"), "{err}");
}

#[tokio::test]
async fn get_string_returns_raw_json() {
    let client = client().await;
    let raw = client.get_string("weather?q=Oslo&units=metric").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["weather"][0]["description"], "snow");
}

#[tokio::test]
async fn configured_headers_reach_the_server() {
    let base = start_server().await;
    let config = ClientConfig::new(base)
        .user_agent("weather-tests/1.0")
        .accept_type("application/vnd.weather+json")
        .bearer("s3cret")
        .header("X-Client-Id", "integration")
        .header("Accept", "text/plain");
    let client = RestClient::with_config(config).unwrap();

    let echoed = client
        .get::<HashMap<String, String>>("echo/headers")
        .await
        .unwrap()
        .into_data()
        .unwrap();

    assert_eq!(echoed["accept"], "application/vnd.weather+json");
    assert_eq!(echoed["content-type"], "application/json");
    assert_eq!(echoed["user-agent"], "weather-tests/1.0");
    assert_eq!(echoed["authorization"], "Bearer s3cret");
    assert_eq!(echoed["x-client-id"], "integration");
}

#[tokio::test]
async fn authorization_absent_by_default() {
    let client = client().await;
    let echoed = client
        .post::<_, HashMap<String, String>>("echo/headers", &serde_json::json!({}))
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert!(!echoed.contains_key("authorization"));
    assert_eq!(echoed["user-agent"], "rest-core");
}

#[tokio::test]
async fn station_lifecycle() {
    let client = client().await;

    // create
    let input = NewStation {
        name: "Gatwick",
        latitude: 51.15,
        longitude: -0.18,
    };
    let created = client.post::<_, Station>("stations", &input).await.unwrap();
    assert_eq!(created.status_code(), 201);
    let station = created.into_data().unwrap();
    let route = format!("stations/{}", station.id);

    // get
    let fetched = client.get::<Station>(&route).await.unwrap();
    assert_eq!(fetched.data.as_ref(), Some(&station));

    // patch
    let patched = client
        .patch::<_, Station>(&route, &serde_json::json!({"name": "LGW"}))
        .await
        .unwrap()
        .into_data()
        .unwrap();
    assert_eq!(patched.name, "LGW");
    assert_eq!(patched.latitude, 51.15);

    // put
    let replacement = NewStation {
        name: "Gatwick North",
        latitude: 51.16,
        longitude: -0.17,
    };
    let status = client.put_status(&route, &replacement).await.unwrap();
    assert!(status.is_success);

    // delete
    let status = client.delete_status(&route).await.unwrap();
    assert_eq!(status.status_code, 204);

    // delete again: not found, still not an error
    let again = client.delete::<Station>(&route).await.unwrap();
    assert!(!again.is_success());
    assert_eq!(again.status_code(), 404);

    // list is empty
    let list = client.get::<Vec<Station>>("stations").await.unwrap();
    assert_eq!(list.into_data(), Some(Vec::new()));
}

#[tokio::test]
async fn patch_missing_station_reports_404() {
    let client = client().await;
    let route = format!("stations/{}", Uuid::nil());
    let status = client
        .patch_status(&route, &serde_json::json!({"name": "x"}))
        .await
        .unwrap();
    assert!(!status.is_success);
    assert_eq!(status.status_code, 404);
}

#[tokio::test]
async fn cancellation_aborts_slow_request() {
    let client = client().await;
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = client.cancellable(&token).get_string("slow").await.unwrap_err();

    assert!(matches!(err, RestError::Cancelled));
    assert!(started.elapsed() < mock_server::SLOW_DELAY);
}

#[tokio::test]
async fn timeout_is_a_transport_error() {
    let base = start_server().await;
    let config = ClientConfig::new(base).timeout(Duration::from_secs(1));
    let client = RestClient::with_config(config).unwrap();

    let err = client.get_status("slow").await.unwrap_err();

    assert!(matches!(
        err,
        RestError::TransportError(rest_core::TransportError::Timeout(_))
    ));
}

#[tokio::test]
async fn sub_second_timeout_allows_fast_responses() {
    let base = start_server().await;
    let config = ClientConfig::new(base).timeout(Duration::from_millis(500));
    let client = RestClient::with_config(config).unwrap();

    let status = client.get_status("empty").await.unwrap();
    assert!(status.is_success);

    let err = client.get_status("slow").await.unwrap_err();
    assert!(matches!(
        err,
        RestError::TransportError(rest_core::TransportError::Timeout(_))
    ));
}

#[tokio::test]
async fn transport_errors_do_not_expose_the_query() {
    let base = start_server().await;
    let config = ClientConfig::new(base).timeout(Duration::from_millis(200));
    let client = RestClient::with_config(config).unwrap();

    let err = client.get_status("slow?appid=secret-key").await.unwrap_err();
    assert!(!err.to_string().contains("secret-key"), "{err}");
}

#[tokio::test]
async fn factory_clients_share_one_pool() {
    let base = start_server().await;
    let factory = RestClientFactory::new(ReqwestTransport::default());

    let weather = factory.create(&base).unwrap();
    let stations = factory
        .create_with_config(ClientConfig::new(format!("{base}/stations")))
        .unwrap();

    let london = weather.get::<Weather>("weather?q=London").await.unwrap();
    assert!(london.is_success());
    let list = stations.get::<Vec<Station>>("").await.unwrap();
    assert_eq!(list.into_data(), Some(Vec::new()));
}
