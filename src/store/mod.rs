//! Ticket persistence behind a narrow document-store style contract.
//!
//! The purchase flow only ever appends ticket records and reads them back;
//! it never updates or deletes. Adapters exist for the relational database
//! and for an in-process map used by tests and local runs.

use async_trait::async_trait;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::models::TicketRecord;

pub mod database;
pub mod memory;

pub use database::DatabaseTicketStore;
pub use memory::MemoryTicketStore;

/// Write failures classified the way the purchase flow reports them.
///
/// Each class maps to its own user-facing message; everything else the
/// store knows about the failure stays in the log.
#[derive(Debug, Clone, Error, Serialize)]
pub enum StoreError {
    #[error("permission-denied: {0}")]
    PermissionDenied(String),

    #[error("not-found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("resource-exhausted: {0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Short machine-readable class, mirroring document-store error codes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "permission-denied",
            Self::NotFound(_) => "not-found",
            Self::Unavailable(_) => "unavailable",
            Self::QuotaExceeded(_) => "resource-exhausted",
            Self::Other(_) => "unknown",
        }
    }

    /// The message shown to the buyer when a ticket write fails with this
    /// class. Payment has already settled at that point, so the messages
    /// steer the user toward support rather than a retry.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(_) => {
                "Permission denied! Please check your account.".to_string()
            }
            Self::NotFound(_) => {
                "Tickets collection not found. Please contact support.".to_string()
            }
            Self::Unavailable(_) => "Service unavailable. Check your connection.".to_string(),
            Self::QuotaExceeded(detail) | Self::Other(detail) => {
                format!("Failed to save ticket: {}", detail)
            }
        }
    }

    /// Folds a database error into the flow's error classes.
    pub fn classify_db(err: DbErr) -> Self {
        match &err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Unavailable(err.to_string()),
            _ => {
                let detail = err.to_string();
                let lowered = detail.to_ascii_lowercase();
                if lowered.contains("permission denied") || lowered.contains("read-only") {
                    Self::PermissionDenied(detail)
                } else if lowered.contains("no such table") || lowered.contains("does not exist") {
                    Self::NotFound(detail)
                } else if lowered.contains("disk full")
                    || lowered.contains("quota")
                    || lowered.contains("database or disk is full")
                {
                    Self::QuotaExceeded(detail)
                } else {
                    Self::Other(detail)
                }
            }
        }
    }
}

/// Append-and-read contract over the "tickets" collection.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Writes a record and returns the stored document identity.
    ///
    /// Timestamps for `purchased_at` and `created_at` are assigned here,
    /// at write time, not by the caller.
    async fn add_ticket(&self, record: TicketRecord) -> Result<String, StoreError>;

    /// Reads a record back by the identity `add_ticket` returned.
    async fn get_ticket(&self, id: &str) -> Result<Option<TicketRecord>, StoreError>;

    /// All tickets owned by a user, newest purchase first.
    async fn tickets_for_user(&self, user_id: &str) -> Result<Vec<TicketRecord>, StoreError>;

    /// All tickets sold for an event, matched by stored title. Tickets
    /// carry no listing foreign key.
    async fn tickets_for_event(&self, event_title: &str) -> Result<Vec<TicketRecord>, StoreError>;

    /// Owner-scoped check-in lookup by verification code.
    async fn find_by_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<Option<TicketRecord>, StoreError>;
}
