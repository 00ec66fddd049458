use crate::compose;
use crate::error::DeliveryError;
use crate::registry::{Registry, Resolution};
use crate::telegram::MessageSender;
use crate::types::{FormatHint, IncomingTrigger};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidCredentials,
    NoContent,
}

/// What happened to a single trigger request.
#[derive(Debug)]
pub enum Outcome {
    Delivered {
        event_name: String,
        composed_message: String,
    },
    Rejected(RejectReason),
    DeliveryFailed(DeliveryError),
}

/// Validates a trigger, composes its message and hands it to the sender.
#[derive(Clone)]
pub struct TriggerHandler {
    registry: Arc<Registry>,
    sender: Arc<dyn MessageSender>,
}

impl TriggerHandler {
    pub fn new(registry: Arc<Registry>, sender: Arc<dyn MessageSender>) -> Self {
        Self { registry, sender }
    }

    pub async fn handle(&self, trigger: IncomingTrigger) -> Outcome {
        let destination = match self
            .registry
            .resolve(&trigger.webhook_name, &trigger.webhook_key)
        {
            Resolution::Found(dest) => dest,
            Resolution::NotFound => {
                tracing::warn!(webhook = %trigger.webhook_name, "rejected trigger with invalid name or key");
                return Outcome::Rejected(RejectReason::InvalidCredentials);
            }
        };

        let payload = trigger.body.as_deref().and_then(compose::parse_payload);
        let Some(message) = compose::compose_message(&trigger.params, payload.as_ref()) else {
            tracing::info!(webhook = %trigger.webhook_name, "no data to send");
            return Outcome::Rejected(RejectReason::NoContent);
        };

        let hint = FormatHint::from_token(trigger.params.value3.as_deref());

        match self.sender.send_message(destination, &message, hint).await {
            Ok(()) => {
                tracing::info!(
                    webhook = %trigger.webhook_name,
                    format = ?hint,
                    composed = %message,
                    "event fired"
                );
                Outcome::Delivered {
                    event_name: trigger.webhook_name,
                    composed_message: message,
                }
            }
            Err(e) => {
                tracing::error!(webhook = %trigger.webhook_name, error = %e, "message delivery failed");
                Outcome::DeliveryFailed(e)
            }
        }
    }
}
