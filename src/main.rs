use std::io::Read;

use anyhow::{bail, Context, Result};
use tokio::signal;

use ara_fcm_push::config::Settings;
use ara_fcm_push::delivery::{create_dispatcher, DeliveryResult, PushDispatcher};
use ara_fcm_push::message::PushRequest;
use ara_fcm_push::notifiable::DeliveryMethod;
use ara_fcm_push::telemetry::init_telemetry;

const USAGE: &str = "usage: ara-fcm-push <request.json | ->";

#[tokio::main]
async fn main() -> Result<()> {
    let path = match std::env::args().nth(1) {
        Some(path) if path != "-h" && path != "--help" => path,
        _ => bail!(USAGE),
    };

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;

    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!(project_id = %settings.firebase.project_id, "Configuration loaded");

    let request = PushRequest::from_json(&read_request(&path)?)?;
    let dispatcher = create_dispatcher(&settings).await?;

    let result = tokio::select! {
        result = dispatch(&dispatcher, request) => result?,
        _ = signal::ctrl_c() => {
            tracing::warn!("Received Ctrl+C, abandoning send");
            bail!("interrupted");
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    let stats = dispatcher.stats();
    tracing::info!(
        delivered = stats.delivered,
        ignored = stats.ignored,
        failed = stats.failed,
        "Done"
    );

    if !result.is_success() {
        bail!("push send did not succeed");
    }
    Ok(())
}

async fn dispatch(dispatcher: &PushDispatcher, request: PushRequest) -> ara_fcm_push::Result<DeliveryResult> {
    let message = request.to_descriptor();

    if request.raw.is_some() {
        return dispatcher.send_raw(message).await;
    }

    match request.delivery_method {
        DeliveryMethod::Notification => dispatcher.send_as_notification(message, request.tokens).await,
        DeliveryMethod::Message => dispatcher.send_as_message(message, request.tokens).await,
    }
}

fn read_request(path: &str) -> Result<String> {
    if path == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read request from stdin")?;
        return Ok(input);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}
