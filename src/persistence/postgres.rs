//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::NotificationRow;
use crate::error::GatewayError;
use crate::notification::Notification;

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
///
/// Mirrors the in-memory notification inboxes (reloaded into the store
/// at startup) and appends every domain event to a durable audit log.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), GatewayError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS auction_events (
                 id BIGSERIAL PRIMARY KEY,
                 auction_id UUID NOT NULL,
                 event_type TEXT NOT NULL,
                 payload JSONB NOT NULL,
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now()
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notifications (
                 id UUID PRIMARY KEY,
                 recipient_id UUID NOT NULL,
                 kind TEXT NOT NULL,
                 title TEXT NOT NULL,
                 body TEXT NOT NULL,
                 auction_id UUID,
                 read BOOLEAN NOT NULL DEFAULT FALSE,
                 action_url TEXT,
                 action_label TEXT,
                 created_at TIMESTAMPTZ NOT NULL
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        auction_id: Uuid,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, GatewayError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO auction_events (auction_id, event_type, payload) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(auction_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Mirrors a notification write.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_notification(&self, notification: &Notification) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO notifications \
             (id, recipient_id, kind, title, body, auction_id, read, action_url, action_label, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) ON CONFLICT (id) DO NOTHING",
        )
        .bind(notification.id.as_uuid())
        .bind(notification.recipient_id.as_uuid())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.auction_id.map(|id| *id.as_uuid()))
        .bind(notification.read)
        .bind(notification.action_url.as_deref())
        .bind(notification.action_label.as_deref())
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Mirrors a single mark-read transition.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn mark_read(&self, recipient_id: Uuid, id: Uuid) -> Result<(), GatewayError> {
        sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Mirrors a mark-all-read transition, returning rows affected.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64, GatewayError> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(result.rows_affected())
    }

    /// Loads every mirrored notification, oldest first, for restart
    /// recovery of the in-memory inboxes.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_notifications(&self) -> Result<Vec<NotificationRow>, GatewayError> {
        let rows = sqlx::query_as::<
            _,
            (
                Uuid,
                Uuid,
                String,
                String,
                String,
                Option<Uuid>,
                bool,
                Option<String>,
                Option<String>,
                DateTime<Utc>,
            ),
        >(
            "SELECT id, recipient_id, kind, title, body, auction_id, read, \
                    action_url, action_label, created_at \
             FROM notifications ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    id,
                    recipient_id,
                    kind,
                    title,
                    body,
                    auction_id,
                    read,
                    action_url,
                    action_label,
                    created_at,
                )| {
                    NotificationRow {
                        id,
                        recipient_id,
                        kind,
                        title,
                        body,
                        auction_id,
                        read,
                        action_url,
                        action_label,
                        created_at,
                    }
                },
            )
            .collect())
    }
}
