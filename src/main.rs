//! Wiring & DI. Entry point: bootstrap adapters, start the dispatcher, submit one batch.
//! No business logic here; forwarding is delegated to the Dispatcher.
//!
//! Usage: `sms-forwarder [batch.json]` (reads stdin when no path is given).

use dotenv::dotenv;
use sms_forwarder::adapters::persistence::JsonTokenStore;
use sms_forwarder::adapters::salesforce::{PasswordGrantAuthAdapter, SalesforceCrmGateway};
use sms_forwarder::adapters::source::load_batch;
use sms_forwarder::domain::{BatchOutcome, Classifier, Notification, PayloadBuilder};
use sms_forwarder::ports::{AuthPort, CrmGateway, ForwardingPort, TokenStorePort};
use sms_forwarder::shared::config::AppConfig;
use sms_forwarder::usecases::{AuthService, Dispatcher, ForwardingPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("load config: {}", e))?;
    let grant = cfg.grant().map_err(|e| anyhow::anyhow!("{}", e))?;
    let id_mode = cfg.external_id_mode().map_err(|e| anyhow::anyhow!("{}", e))?;

    // --- Credential store ---
    let token_path = PathBuf::from(cfg.token_path_or_default());
    let token_store = JsonTokenStore::new(&token_path);
    token_store
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(path = %token_path.display(), "token store ready");
    let tokens: Arc<dyn TokenStorePort> = Arc::new(token_store);

    // --- Salesforce adapters ---
    let auth_adapter: Arc<dyn AuthPort> = Arc::new(PasswordGrantAuthAdapter::new(grant));
    let resource_path = cfg.resource_path_or_default();
    info!(resource_path = %resource_path, "CRM record endpoint");
    let gateway: Arc<dyn CrmGateway> = Arc::new(SalesforceCrmGateway::new(resource_path));

    // --- Pipeline + single serialized worker ---
    let device = cfg.device_name_or_default();
    info!(device = %device, id_mode = ?id_mode, "forwarding pipeline configured");
    let pipeline = ForwardingPipeline {
        auth: AuthService::new(auth_adapter, tokens),
        gateway,
        classifier: Classifier::new(id_mode).with_extra_markers(cfg.extra_markers()),
        payloads: PayloadBuilder::new(device),
    };
    let (dispatcher, worker) = Dispatcher::spawn(pipeline);

    // --- Presentation: render notifications as log lines ---
    let notifications = tokio::spawn(render_notifications(dispatcher.subscribe()));

    if cfg.login_on_start_or_default() {
        if let Err(e) = dispatcher.authenticate().await {
            warn!(error = %e, "startup login failed; will retry when a batch arrives");
        }
    }

    // --- Upstream source: one batch from file or stdin ---
    let batch_path = std::env::args().nth(1).map(PathBuf::from);
    let messages = load_batch(batch_path.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let report = dispatcher
        .submit_batch(messages)
        .report()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    drop(dispatcher);
    worker
        .await
        .map_err(|e| anyhow::anyhow!("dispatch worker panicked: {}", e))?;
    let _ = notifications.await;

    if let BatchOutcome::AuthenticationFailed(e) = &report.outcome {
        anyhow::bail!("batch {} not forwarded: {}", report.batch_id, e);
    }
    Ok(())
}

/// Stand-in for the host UI's toasts.
async fn render_notifications(mut rx: broadcast::Receiver<Notification>) {
    loop {
        match rx.recv().await {
            Ok(Notification::AuthenticationFailed { batch_id, error }) => {
                error!(batch_id = ?batch_id, "Failed to authenticate with Salesforce: {}", error);
            }
            Ok(Notification::BatchForwarded { batch_id, tally }) => {
                info!(
                    batch_id,
                    sent = tally.sent,
                    dropped = tally.dropped,
                    failed = tally.failed,
                    "batch forwarded"
                );
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "notification listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
