use anyhow::Context;
use nexus_webhook_relay::config::Config;
use nexus_webhook_relay::handler::TriggerHandler;
use nexus_webhook_relay::http_server;
use nexus_webhook_relay::telegram::TelegramSender;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const LOG_FORMAT_ENV: &str = "RELAY_LOG_FORMAT";

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    http_server::install_panic_hook();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "webhook-relay: failed to load configuration");
            return Err(e).context("loading configuration");
        }
    };

    let mut names: Vec<&str> = config.registry.names().collect();
    names.sort_unstable();
    tracing::info!(
        path = %config.path.display(),
        count = config.registry.len(),
        webhooks = ?names,
        "webhook-relay: configuration loaded"
    );
    if config.registry.is_empty() {
        tracing::warn!("webhook-relay: no webhooks configured, every trigger will be rejected");
    }

    let sender = TelegramSender::new(&config.telegram).context("building telegram client")?;
    let addr = config.bind_addr();
    let handler = TriggerHandler::new(Arc::new(config.registry), Arc::new(sender));

    http_server::start(&addr, handler)
        .await
        .with_context(|| format!("serving on {addr}"))
}

/// Structured logs to stdout; JSON lines when `RELAY_LOG_FORMAT=json`.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nexus_webhook_relay=debug"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
