use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::EntityKind,
    state::{ReconcileSummary, SweepReport},
};

/// Connectivity event pushed by the host.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConnectivityRequest {
    pub online: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectivityResponse {
    pub online: bool,
    /// Whether a remote backend is currently installed.
    pub backend_connected: bool,
    /// Records waiting for the next sweep, across every collection.
    pub pending: usize,
}

/// Counters of one snapshot merge.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileCounts {
    pub adopted: usize,
    pub replaced: usize,
    pub unchanged: usize,
    pub kept_local: usize,
    pub dropped: usize,
    pub skipped: usize,
}

impl From<ReconcileSummary> for ReconcileCounts {
    fn from(summary: ReconcileSummary) -> Self {
        Self {
            adopted: summary.adopted,
            replaced: summary.replaced,
            unchanged: summary.unchanged,
            kept_local: summary.kept_local,
            dropped: summary.dropped,
            skipped: summary.skipped,
        }
    }
}

/// Sweep and refresh outcome for one collection.
#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionSyncReport {
    pub collection: String,
    pub attempted: usize,
    pub created: usize,
    pub updated: usize,
    pub remote_newer: usize,
    pub skipped: usize,
    /// Toast messages of the pushes that failed.
    pub failures: Vec<String>,
    /// Present when the follow-up snapshot refresh succeeded.
    pub refreshed: Option<ReconcileCounts>,
    /// Set when the collection could not be swept at all.
    pub error: Option<String>,
}

impl CollectionSyncReport {
    pub fn new(report: SweepReport, refreshed: Option<ReconcileSummary>) -> Self {
        Self {
            collection: report.collection.to_string(),
            attempted: report.attempted,
            created: report.created,
            updated: report.updated,
            remote_newer: report.remote_newer,
            skipped: report.skipped,
            failures: report
                .failures
                .into_iter()
                .map(|failure| failure.message)
                .collect(),
            refreshed: refreshed.map(ReconcileCounts::from),
            error: None,
        }
    }

    /// Report for a collection whose sweep returned an error.
    pub fn failed(collection: EntityKind, message: String) -> Self {
        Self {
            collection: collection.to_string(),
            attempted: 0,
            created: 0,
            updated: 0,
            remote_newer: 0,
            skipped: 0,
            failures: Vec::new(),
            refreshed: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyncResponse {
    pub collections: Vec<CollectionSyncReport>,
}
