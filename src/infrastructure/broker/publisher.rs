//! Fire-and-forget event publishing.

use crate::error::AppError;
use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use tracing::debug;

/// Publisher for one-way event messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), AppError>;
}

/// AMQP publisher. Events are published persistent: unlike RPC requests,
/// click events survive a broker restart.
pub struct AmqpEventPublisher {
    channel: Channel,
}

impl AmqpEventPublisher {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl EventPublisher for AmqpEventPublisher {
    async fn publish(&self, queue: &str, payload: Vec<u8>) -> Result<(), AppError> {
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(2);

        let _confirm = self
            .channel
            .basic_publish("", queue, BasicPublishOptions::default(), &payload, properties)
            .await
            .map_err(|e| {
                AppError::queue("failed to publish event")
                    .with_context("queue", queue)
                    .wrap(e)
            })?;

        debug!(queue, bytes = payload.len(), "event published");
        Ok(())
    }
}
