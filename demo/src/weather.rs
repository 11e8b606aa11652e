//! Current-weather lookup against an OpenWeatherMap-compatible API.

use rest_core::{CancellationToken, ClientConfig, RestClient, RestError, Result, Transport, TypedResponse};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/";
pub const DEFAULT_CITY: &str = "London";
pub const DEFAULT_UNITS: &str = "imperial";

#[derive(Debug, Deserialize)]
pub struct WeatherResponse {
    pub name: String,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Conditions>,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct Conditions {
    pub description: String,
}

/// Demo settings, read from `WEATHER_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub city: String,
    pub units: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let api_key = lookup("WEATHER_API_KEY")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| RestError::ConfigError("WEATHER_API_KEY is not set".to_string()))?;
        Ok(Self {
            base_url: var("WEATHER_BASE_URL", DEFAULT_BASE_URL),
            api_key,
            city: var("WEATHER_CITY", DEFAULT_CITY),
            units: var("WEATHER_UNITS", DEFAULT_UNITS),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).user_agent(concat!("weather-demo/", env!("CARGO_PKG_VERSION")))
    }

    pub fn route(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("q", &self.city)
            .append_pair("appid", &self.api_key)
            .append_pair("units", &self.units)
            .finish();
        format!("weather?{query}")
    }

    pub fn unit_symbol(&self) -> &'static str {
        match self.units.as_str() {
            "metric" => "C",
            "imperial" => "F",
            _ => "K",
        }
    }
}

pub async fn fetch<T: Transport>(
    client: &RestClient<T>,
    settings: &Settings,
    token: &CancellationToken,
) -> Result<TypedResponse<WeatherResponse>> {
    client.cancellable(token).get(&settings.route()).await
}

pub fn render(weather: &WeatherResponse, settings: &Settings) -> String {
    let description = weather
        .weather
        .first()
        .map_or("unknown", |conditions| conditions.description.as_str());
    format!(
        "Weather data:\nCity: {}\nTemperature: {:.1}°{}\nWeather: {}",
        weather.name,
        weather.main.temp,
        settings.unit_symbol(),
        description
    )
}

/// Text printed for one lookup, whatever its outcome.
pub fn report(outcome: Result<TypedResponse<WeatherResponse>>, settings: &Settings) -> String {
    match outcome {
        Ok(response) if response.is_success() => match response.data {
            Some(weather) => render(&weather, settings),
            None => "Error: empty response".to_string(),
        },
        Ok(response) => format!("Error: {}", response.reason_phrase()),
        Err(e) => format!("Exception: {e}"),
    }
}
