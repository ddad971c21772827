//! Record-source collaborator.
//!
//! The engine only needs scan access to ticket rows plus the reference
//! lookups (ticket types, clients, feedback). `TicketSource` is that seam;
//! the shipped implementation serves an immutable JSON snapshot loaded at
//! startup, and anything with a tabular scan can stand in behind the trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use triage_shared::{Client, Feedback, Ticket, TicketType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable view of the full dataset for one request. Cheap to clone; all
/// concurrent requests share the same allocation.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub tickets: Arc<Vec<Ticket>>,
    pub ticket_types: Arc<HashMap<i64, TicketType>>,
    pub clients: Arc<HashMap<i64, Client>>,
    pub feedback: Arc<Vec<Feedback>>,
}

/// External record store supplying ticket rows and reference lookups.
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;
}

/// On-disk snapshot file layout.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    tickets: Vec<Ticket>,
    #[serde(default)]
    ticket_types: Vec<TicketType>,
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    feedback: Vec<Feedback>,
}

/// In-memory source backed by a JSON snapshot file.
#[derive(Debug)]
pub struct InMemorySource {
    snapshot: Snapshot,
}

impl InMemorySource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let display_path = path.display().to_string();

        let raw = std::fs::read(path).map_err(|source| StoreError::Read {
            path: display_path.clone(),
            source,
        })?;
        let file: SnapshotFile =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
                path: display_path.clone(),
                source,
            })?;

        tracing::info!(
            tickets = file.tickets.len(),
            ticket_types = file.ticket_types.len(),
            clients = file.clients.len(),
            feedback = file.feedback.len(),
            "loaded ticket snapshot from {}",
            display_path
        );

        Ok(Self {
            snapshot: Snapshot {
                tickets: Arc::new(file.tickets),
                ticket_types: Arc::new(
                    file.ticket_types.into_iter().map(|t| (t.id, t)).collect(),
                ),
                clients: Arc::new(file.clients.into_iter().map(|c| (c.id, c)).collect()),
                feedback: Arc::new(file.feedback),
            },
        })
    }

    /// Build a source from already-materialized rows (tests, embedding).
    pub fn from_rows(
        tickets: Vec<Ticket>,
        ticket_types: Vec<TicketType>,
        clients: Vec<Client>,
        feedback: Vec<Feedback>,
    ) -> Self {
        Self {
            snapshot: Snapshot {
                tickets: Arc::new(tickets),
                ticket_types: Arc::new(ticket_types.into_iter().map(|t| (t.id, t)).collect()),
                clients: Arc::new(clients.into_iter().map(|c| (c.id, c)).collect()),
                feedback: Arc::new(feedback),
            },
        }
    }
}

#[async_trait]
impl TicketSource for InMemorySource {
    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot.clone())
    }
}
