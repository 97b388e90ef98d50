//! Persistence layer: PostgreSQL event log and notification mirror.
//!
//! Optional (gated by `PERSISTENCE_ENABLED`): the gateway runs fully
//! in-memory without it. With it enabled every fan-out write is
//! mirrored, mirrored inboxes are reloaded at startup, and domain
//! events accumulate in an append-only audit log. Uses `sqlx::PgPool`
//! for async PostgreSQL access.

pub mod models;
pub mod postgres;

pub use postgres::PostgresPersistence;
