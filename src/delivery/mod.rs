//! Delivery engine: recipient resolution, gateway transport, outcome
//! classification and batch dispatch.

mod dispatcher;
mod outcome;
mod recipients;
mod transport;

use std::sync::Arc;

use crate::config::Settings;
use crate::credentials::create_credential_provider;
use crate::error::Result;

pub use dispatcher::{
    DispatcherStats, DispatcherStatsSnapshot, PushDispatcher, DEFAULT_MAX_CONCURRENCY,
};
pub use outcome::{BatchPolicy, DeliveryFailure, DeliveryReport, DeliveryResult, Outcome};
pub use recipients::Recipients;
pub use transport::{build_http_client, HttpTransport, PushTransport, TransportResponse};

/// Build a dispatcher wired to the real gateway from settings
pub async fn create_dispatcher(settings: &Settings) -> Result<PushDispatcher> {
    let policy: BatchPolicy = settings.delivery.batch_policy.parse()?;
    let http = build_http_client(&settings.firebase)?;

    let credentials = create_credential_provider(settings, http.clone()).await?;
    let transport = HttpTransport::from_config(http, &settings.firebase);

    tracing::info!(
        project_id = %settings.firebase.project_id,
        send_url = %transport.send_url(),
        policy = %policy,
        max_concurrency = settings.delivery.max_concurrency,
        "Push dispatcher created"
    );

    Ok(PushDispatcher::new(credentials, Arc::new(transport))
        .with_policy(policy)
        .with_max_concurrency(settings.delivery.max_concurrency))
}
