//! Message broker integration: request/reply RPC and event publishing.

mod publisher;
mod rpc_client;

pub use publisher::{AmqpEventPublisher, EventPublisher};
pub use rpc_client::{AmqpRpcClient, RpcClient};

#[cfg(test)]
pub use publisher::MockEventPublisher;
#[cfg(test)]
pub use rpc_client::MockRpcClient;

use crate::error::AppError;
use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};
use tracing::info;

/// Shared AMQP connection and channel, initialized once at startup and
/// closed last-in-first-out at shutdown.
pub struct Broker {
    connection: Connection,
    channel: Channel,
}

impl Broker {
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| AppError::queue("failed to connect to broker").wrap(e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| AppError::queue("failed to open broker channel").wrap(e))?;

        info!("Connected to message broker");

        Ok(Self { connection, channel })
    }

    /// Declares the durable queues this service publishes to. Failure here
    /// is fatal at startup.
    pub async fn declare_queues(&self, queues: &[&str]) -> Result<(), AppError> {
        for queue in queues {
            self.channel
                .queue_declare(
                    queue,
                    QueueDeclareOptions {
                        durable: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(|e| {
                    AppError::queue("failed to declare queue")
                        .with_context("queue", *queue)
                        .wrap(e)
                })?;
            info!(queue, "Declared queue");
        }
        Ok(())
    }

    pub fn rpc_client(&self) -> AmqpRpcClient {
        AmqpRpcClient::new(self.channel.clone())
    }

    pub fn publisher(&self) -> AmqpEventPublisher {
        AmqpEventPublisher::new(self.channel.clone())
    }

    /// Closes channel then connection. Errors are logged, not propagated;
    /// shutdown keeps going.
    pub async fn close(&self) {
        if let Err(e) = self.channel.close(200, "shutdown").await {
            tracing::warn!(error = %e, "failed to close broker channel");
        }
        if let Err(e) = self.connection.close(200, "shutdown").await {
            tracing::warn!(error = %e, "failed to close broker connection");
        }
    }
}
