//! Correlation-ID request/reply over the broker.
//!
//! Each call declares its own exclusive, auto-delete reply queue, publishes
//! the request with `reply_to` and a fresh correlation ID, and waits for a
//! single matching delivery. RPC is latency-oriented: requests are
//! published transient, never persisted.

use crate::error::AppError;
use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicCancelOptions, BasicConsumeOptions, BasicPublishOptions, QueueDeclareOptions,
    QueueDeleteOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// Request/reply call over a message broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Publishes `payload` to `queue` and returns the reply body.
    ///
    /// Waits, in order of priority, for the correlated delivery, the
    /// `timeout`, or `cancel` firing.
    ///
    /// # Errors
    ///
    /// - `REQUEST_TIMEOUT` when no reply arrives within `timeout`
    /// - `QUEUE_ERROR` on broker failures, a correlation-ID mismatch, or
    ///   cancellation
    async fn call(
        &self,
        queue: &str,
        payload: Vec<u8>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<Vec<u8>, AppError>;
}

/// Releases a call's reply queue and consumer on every exit path.
///
/// Normal paths call [`ReplyQueueGuard::release`]; if the call future is
/// dropped mid-wait (caller cancelled upstream), `Drop` spawns the same
/// teardown so the queue does not linger on the shared channel.
struct ReplyQueueGuard {
    channel: Channel,
    consumer_tag: String,
    reply_queue: String,
    released: bool,
}

impl ReplyQueueGuard {
    fn new(channel: Channel, consumer_tag: String, reply_queue: String) -> Self {
        Self {
            channel,
            consumer_tag,
            reply_queue,
            released: false,
        }
    }

    async fn release(mut self) {
        self.released = true;
        Self::teardown(&self.channel, &self.consumer_tag, &self.reply_queue).await;
    }

    async fn teardown(channel: &Channel, consumer_tag: &str, reply_queue: &str) {
        if let Err(e) = channel
            .basic_cancel(consumer_tag, BasicCancelOptions::default())
            .await
        {
            tracing::warn!(error = %e, reply_queue, "failed to cancel reply consumer");
        }

        if let Err(e) = channel
            .queue_delete(reply_queue, QueueDeleteOptions::default())
            .await
        {
            tracing::warn!(error = %e, reply_queue, "failed to delete reply queue");
        }
    }
}

impl Drop for ReplyQueueGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let channel = self.channel.clone();
        let consumer_tag = std::mem::take(&mut self.consumer_tag);
        let reply_queue = std::mem::take(&mut self.reply_queue);

        // Drop may run outside a runtime during process teardown, where the
        // broker connection is being closed anyway.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                Self::teardown(&channel, &consumer_tag, &reply_queue).await;
            });
        }
    }
}

/// AMQP implementation sharing one channel across calls.
///
/// Reply-queue declaration, consumer registration, and the publish are
/// serialized behind a mutex; waiting for the reply happens outside it so
/// concurrent calls only contend on setup.
pub struct AmqpRpcClient {
    channel: tokio::sync::Mutex<Channel>,
}

impl AmqpRpcClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel: tokio::sync::Mutex::new(channel),
        }
    }
}

#[async_trait]
impl RpcClient for AmqpRpcClient {
    async fn call(
        &self,
        queue: &str,
        payload: Vec<u8>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<Vec<u8>, AppError> {
        let correlation_id = Uuid::new_v4().to_string();

        let (mut consumer, guard) = {
            let channel = self.channel.lock().await;

            let reply_queue = channel
                .queue_declare(
                    "",
                    QueueDeclareOptions {
                        exclusive: true,
                        auto_delete: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(|e| AppError::queue("failed to declare reply queue").wrap(e))?;

            let reply_name = reply_queue.name().as_str().to_string();

            let consumer = channel
                .basic_consume(
                    &reply_name,
                    "",
                    BasicConsumeOptions {
                        no_ack: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(|e| AppError::queue("failed to register reply consumer").wrap(e))?;

            let guard = ReplyQueueGuard::new(
                channel.clone(),
                consumer.tag().as_str().to_string(),
                reply_name,
            );

            let properties = BasicProperties::default()
                .with_content_type("application/json".into())
                .with_correlation_id(correlation_id.as_str().into())
                .with_reply_to(guard.reply_queue.as_str().into())
                .with_delivery_mode(1);

            let _confirm = channel
                .basic_publish(
                    "",
                    queue,
                    BasicPublishOptions::default(),
                    &payload,
                    properties,
                )
                .await
                .map_err(|e| {
                    AppError::queue("failed to publish rpc request")
                        .with_context("queue", queue)
                        .wrap(e)
                })?;

            (consumer, guard)
        };

        debug!(queue, %correlation_id, reply_queue = %guard.reply_queue, "rpc request sent");

        // Priority: delivery, then timeout, then cancellation.
        let outcome = tokio::select! {
            biased;
            delivery = consumer.next() => match delivery {
                Some(Ok(delivery)) => {
                    let delivered_id = delivery
                        .properties
                        .correlation_id()
                        .as_ref()
                        .map(|id| id.as_str().to_string())
                        .unwrap_or_default();

                    if delivered_id == correlation_id {
                        Ok(delivery.data)
                    } else {
                        Err(AppError::queue("received reply with mismatched correlation id")
                            .with_context("expected", correlation_id.clone())
                            .with_context("received", delivered_id))
                    }
                }
                Some(Err(e)) => Err(AppError::queue("reply consumer failed").wrap(e)),
                None => Err(AppError::queue("reply consumer closed before delivery")),
            },
            _ = tokio::time::sleep(timeout) => Err(AppError::timeout(format!(
                "rpc call timed out after {:?}",
                timeout
            ))
            .with_context("queue", queue)),
            _ = cancel.cancelled() => {
                Err(AppError::queue("rpc call cancelled").with_context("queue", queue))
            }
        };

        guard.release().await;

        outcome
    }
}
