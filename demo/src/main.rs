use std::process::ExitCode;

use rest_core::{CancellationToken, RestClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod weather;

use weather::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let client = match RestClient::with_config(settings.client_config()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling request");
            trigger.cancel();
        }
    });

    info!(city = %settings.city, units = %settings.units, "fetching current weather");
    let outcome = weather::fetch(&client, &settings, &token).await;
    println!("{}", weather::report(outcome, &settings));
    ExitCode::SUCCESS
}
