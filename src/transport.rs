//! Transport Adapter: delivers updates to the conversation handler by long
//! polling or through a webhook endpoint.

use anyhow::{Context, Result};
use std::convert::Infallible;
use std::sync::Arc;
use teloxide::dispatching::dialogue;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::update_listeners::webhooks;
use teloxide::update_listeners::UpdateListener;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::bot::callback_handler::callback_handler;
use crate::bot::message_handler::{is_start_message, message_handler, start_handler};
use crate::bot::ConversationHandler;
use crate::config::{DeploymentMode, WebhookSettings};
use crate::session::{SessionState, SessionStorage};
use crate::tls_listener::{load_acceptor, TlsListener};

/// Routing of updates to handlers, shared by every deployment mode
///
/// Every handler runs inside the chat's tracking dialogue.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dialogue::enter::<Update, SessionStorage, SessionState, _>()
        .branch(
            Update::filter_message()
                .filter(is_start_message)
                .endpoint(start_handler),
        )
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

/// Run the bot until interrupted
pub async fn run(
    bot: Bot,
    conversation: Arc<ConversationHandler>,
    deployment: &DeploymentMode,
) -> Result<()> {
    info!(mode = deployment.describe(), "Starting update delivery");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![SessionStorage::new(), conversation])
        .enable_ctrlc_handler()
        .build();

    match deployment {
        DeploymentMode::Polling => {
            dispatcher.dispatch().await;
        }
        DeploymentMode::Webhook(settings) => {
            let listener = webhook_listener(bot.clone(), settings).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;

            info!("Removing webhook");
            if let Err(e) = bot.delete_webhook().await {
                warn!(error = %e, "Failed to delete webhook on shutdown");
            }
        }
    }

    info!("Bot stopped");
    Ok(())
}

enum WebhookSocket {
    /// TLS terminated by a reverse proxy
    Plain(TcpListener),
    Tls(TlsListener),
}

/// Register the webhook and start serving it
///
/// The socket is bound before the webhook is registered so a busy port
/// fails start-up without leaving a dangling registration.
async fn webhook_listener(
    bot: Bot,
    settings: &WebhookSettings,
) -> Result<impl UpdateListener<Err = Infallible>> {
    let address = settings.listen_address();
    let url = settings.public_url()?;

    let mut options = webhooks::Options::new(address, url.clone());
    if let Some(secret) = &settings.secret_token {
        options = options.secret_token(secret.clone());
    }

    let socket = match &settings.tls {
        Some(tls) => {
            // Lets the platform trust a self-signed certificate
            options = options.certificate(InputFile::file(tls.cert_path.clone()));
            let acceptor = load_acceptor(tls)?;
            WebhookSocket::Tls(
                TlsListener::bind(address, acceptor)
                    .await
                    .with_context(|| format!("Failed to bind {address}"))?,
            )
        }
        None => WebhookSocket::Plain(
            TcpListener::bind(address)
                .await
                .with_context(|| format!("Failed to bind {address}"))?,
        ),
    };

    let (listener, stop_flag, router) = webhooks::axum_to_router(bot, options)
        .await
        .context("Failed to register webhook")?;
    info!(url = %url, address = %address, tls = settings.tls.is_some(), "Webhook registered");

    tokio::spawn(async move {
        let served = match socket {
            WebhookSocket::Plain(tcp) => {
                axum::serve(tcp, router)
                    .with_graceful_shutdown(stop_flag)
                    .await
            }
            WebhookSocket::Tls(tls) => {
                axum::serve(tls, router)
                    .with_graceful_shutdown(stop_flag)
                    .await
            }
        };
        if let Err(e) = served {
            error!(error = %e, "Webhook server failed");
        }
    });

    Ok(listener)
}
