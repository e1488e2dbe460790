//! Service entry point: configuration, wiring, and the webhook server.

use std::sync::Arc;

use secrecy::SecretString;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tillbot::adapters::http::{router, AppState};
use tillbot::adapters::store::JsonFileCredentialStore;
use tillbot::adapters::stripe::StripeClient;
use tillbot::adapters::telegram::TelegramMessenger;
use tillbot::application::CommandHandler;
use tillbot::config::AppConfig;
use tillbot::ports::{CredentialStore, Messenger, ProcessorClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;

    let store: Arc<dyn CredentialStore> = Arc::new(JsonFileCredentialStore::new(
        &config.storage.credentials_path,
    ));
    let processor: Arc<dyn ProcessorClient> =
        Arc::new(StripeClient::new(config.payment.api_base_url.clone()));
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(
        config.messaging.api_base_url.clone(),
        SecretString::new(config.messaging.bot_token.clone()),
    ));

    let handler = CommandHandler::new(store, processor, messenger, config.payment.clone());
    let app = router(AppState {
        handler: Arc::new(handler),
    });

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "tillbot listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
