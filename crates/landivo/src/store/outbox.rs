use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};

use super::{Pool, RepositoryError};
use crate::notifications::{NewNotification, NotificationKind, OutboxEntry, OutboxRepository};

pub struct SqliteOutboxRepository {
    pool: Pool,
}

impl SqliteOutboxRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// Enqueue inside an open transaction so the notification commits or rolls
/// back together with the write that produced it.
pub(crate) async fn enqueue_tx(
    tx: &mut Transaction<'_, Sqlite>,
    notification: &NewNotification,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        "INSERT INTO outbox (kind, recipient, subject, body, attempt, due_at, created_at) \
         VALUES (?, ?, ?, ?, 0, ?, ?) RETURNING id",
    )
    .bind(notification.kind.as_str())
    .bind(&notification.recipient)
    .bind(&notification.subject)
    .bind(&notification.body)
    .bind(Utc::now())
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.get("id"))
}

#[async_trait]
impl OutboxRepository for SqliteOutboxRepository {
    async fn enqueue(&self, notification: NewNotification) -> Result<i64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = enqueue_tx(&mut tx, &notification).await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn next_due(&self) -> Result<Option<OutboxEntry>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, kind, recipient, subject, body, attempt FROM outbox \
             WHERE datetime(due_at) <= datetime('now') \
             ORDER BY datetime(due_at) ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let kind: String = row.get("kind");
        let kind = NotificationKind::parse(&kind)
            .ok_or_else(|| RepositoryError::Unavailable(format!("unknown outbox kind '{kind}'")))?;

        Ok(Some(OutboxEntry {
            id: row.get("id"),
            kind,
            recipient: row.get("recipient"),
            subject: row.get("subject"),
            body: row.get("body"),
            attempt: row.get("attempt"),
        }))
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM outbox WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn backoff(
        &self,
        id: i64,
        attempt: i32,
        max_cap_secs: i64,
    ) -> Result<(), RepositoryError> {
        // Exponential backoff: 5s * 2^attempt, capped.
        let secs = 5_i64 * (1_i64 << attempt.clamp(0, 10));
        let cap = if max_cap_secs <= 0 { secs } else { max_cap_secs };
        let secs = secs.min(cap);

        sqlx::query(
            "UPDATE outbox SET attempt = ?, due_at = datetime('now', ? || ' seconds') WHERE id = ?",
        )
        .bind(attempt + 1)
        .bind(secs)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outbox")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
