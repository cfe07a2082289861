//! Driving port for the barangay dashboard.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Actor, Barangay, DashboardCounts, Error, SafetyScore};

/// Counters and score for the actor's barangay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Barangay the numbers describe.
    pub barangay: Barangay,
    /// Aggregate counters.
    pub counts: DashboardCounts,
    /// Risk and safety score derived from the counters.
    pub score: SafetyScore,
}

/// Dashboard read use-case.
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Build the dashboard for the actor's barangay.
    async fn dashboard(&self, actor: &Actor) -> Result<DashboardSnapshot, Error>;
}
