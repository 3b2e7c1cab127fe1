//! Durable notification queue. Rows are enqueued inside the transaction that
//! produced them and drained by a background worker, so a crash between a
//! write and its email never loses the notification.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{EmailMessage, EmailSender};
use crate::config::OutboxConfig;
use crate::store::RepositoryError;

/// Which template produced an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OfferReceived,
    OfferUpdated,
    OfferBelowMinimum,
    Campaign,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NotificationKind::OfferReceived => "offer_received",
            NotificationKind::OfferUpdated => "offer_updated",
            NotificationKind::OfferBelowMinimum => "offer_below_minimum",
            NotificationKind::Campaign => "campaign",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "offer_received" => Some(Self::OfferReceived),
            "offer_updated" => Some(Self::OfferUpdated),
            "offer_below_minimum" => Some(Self::OfferBelowMinimum),
            "campaign" => Some(Self::Campaign),
            _ => None,
        }
    }
}

/// A rendered notification waiting to be enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// A persisted outbox row that is due for delivery. Scheduling lives in the
/// store; the worker only needs the payload and the attempt counter.
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub id: i64,
    pub kind: NotificationKind,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attempt: i32,
}

impl OutboxEntry {
    pub fn message(&self) -> EmailMessage {
        EmailMessage {
            to: self.recipient.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }
}

/// Queue storage. `enqueue` exists for paths that are not already inside a
/// storage transaction (e.g. campaign fan-out).
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    async fn enqueue(&self, notification: NewNotification) -> Result<i64, RepositoryError>;

    async fn next_due(&self) -> Result<Option<OutboxEntry>, RepositoryError>;

    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// Push the row's due time out with capped exponential backoff.
    async fn backoff(&self, id: i64, attempt: i32, max_cap_secs: i64)
        -> Result<(), RepositoryError>;

    async fn pending_count(&self) -> Result<i64, RepositoryError>;
}

/// Deliver the next due notification, if any. Returns whether a row was
/// processed so callers can drain in a loop.
pub async fn process_next<R, S>(
    repository: &R,
    sender: &S,
    max_backoff_secs: i64,
) -> Result<bool, RepositoryError>
where
    R: OutboxRepository + ?Sized,
    S: EmailSender + ?Sized,
{
    let Some(entry) = repository.next_due().await? else {
        return Ok(false);
    };

    match sender.send(&entry.message()) {
        Ok(()) => {
            repository.delete(entry.id).await?;
            tracing::info!(
                id = entry.id,
                kind = entry.kind.as_str(),
                recipient = %entry.recipient,
                "notification delivered"
            );
        }
        Err(err) => {
            tracing::warn!(
                ?err,
                id = entry.id,
                kind = entry.kind.as_str(),
                attempt = entry.attempt,
                "notification failed; backing off"
            );
            repository
                .backoff(entry.id, entry.attempt, max_backoff_secs)
                .await?;
        }
    }

    Ok(true)
}

/// Background drain loop. Spawned once at server startup.
pub async fn run_outbox_worker<R>(repository: Arc<R>, sender: Arc<dyn EmailSender>, config: OutboxConfig)
where
    R: OutboxRepository + 'static,
{
    let idle = std::time::Duration::from_secs(config.poll_interval_secs.max(1));
    loop {
        match process_next(repository.as_ref(), sender.as_ref(), config.max_backoff_secs).await {
            Ok(true) => {}
            Ok(false) => tokio::time::sleep(idle).await,
            Err(err) => {
                tracing::error!(%err, "outbox poll failed");
                tokio::time::sleep(idle).await;
            }
        }
    }
}
