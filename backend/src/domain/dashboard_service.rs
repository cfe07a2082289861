//! Dashboard domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    BarangayRepository, BarangayRepositoryError, DashboardQuery, DashboardSnapshot,
    ReportRepository,
};
use crate::domain::report_lifecycle_service::map_report_error;
use crate::domain::{Actor, Error, SafetyScoring, UserRole};

fn map_barangay_error(error: BarangayRepositoryError) -> Error {
    match error {
        BarangayRepositoryError::Connection { message } => {
            Error::store_unavailable("barangay store", &message)
        }
        BarangayRepositoryError::Query { message }
        | BarangayRepositoryError::DuplicateName { name: message } => {
            Error::internal(format!("barangay repository error: {message}"))
        }
    }
}

/// Dashboard service implementing [`DashboardQuery`].
#[derive(Clone)]
pub struct DashboardService<R, B> {
    reports: Arc<R>,
    barangays: Arc<B>,
    scoring: Arc<dyn SafetyScoring>,
}

impl<R, B> DashboardService<R, B> {
    /// Create a service with the given scoring strategy.
    pub fn new(reports: Arc<R>, barangays: Arc<B>, scoring: Arc<dyn SafetyScoring>) -> Self {
        Self {
            reports,
            barangays,
            scoring,
        }
    }
}

#[async_trait]
impl<R, B> DashboardQuery for DashboardService<R, B>
where
    R: ReportRepository,
    B: BarangayRepository,
{
    async fn dashboard(&self, actor: &Actor) -> Result<DashboardSnapshot, Error> {
        if actor.role() == UserRole::Resident {
            return Err(Error::forbidden("dashboard is limited to barangay personnel"));
        }

        let barangay = self
            .barangays
            .find_by_id(&actor.barangay_id())
            .await
            .map_err(map_barangay_error)?
            .ok_or_else(|| Error::not_found("barangay not found"))?;
        let counts = self
            .reports
            .dashboard_counts(&barangay.id)
            .await
            .map_err(map_report_error)?;

        Ok(DashboardSnapshot {
            score: self.scoring.score(&counts),
            barangay,
            counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Barangay, BarangayId, DashboardCounts, ErrorCode, LinearRiskScoring, Report,
        ReportCategory, ReportDraft, ReportId, ReportStatus, SafetyScore, Severity, UserId,
    };
    use crate::test_support::InMemoryReportStore;
    use chrono::Utc;
    use rstest::rstest;

    struct FlatScoring;

    impl SafetyScoring for FlatScoring {
        fn score(&self, _counts: &DashboardCounts) -> SafetyScore {
            SafetyScore::from_risk(7)
        }
    }

    fn seed(
        store: &InMemoryReportStore,
        barangay_id: BarangayId,
        category: ReportCategory,
        status: ReportStatus,
    ) {
        let draft = ReportDraft::new(category, Severity::Critical, "Zone 3", "Collision")
            .expect("valid draft");
        let mut report = Report::file(
            ReportId::random(),
            draft,
            UserId::random(),
            barangay_id,
            Utc::now(),
        );
        report.status = status;
        store.seed_report(report);
    }

    fn setup() -> (Arc<InMemoryReportStore>, Actor) {
        let store = Arc::new(InMemoryReportStore::new());
        let barangay = Barangay::new(BarangayId::random(), "San Isidro", "Antipolo", Utc::now())
            .expect("valid barangay");
        let actor = Actor::new(UserId::random(), UserRole::Employee, barangay.id);
        store.seed_barangay(barangay);
        (store, actor)
    }

    #[rstest]
    #[tokio::test]
    async fn counts_are_scoped_and_scored() {
        let (store, actor) = setup();
        seed(&store, actor.barangay_id(), ReportCategory::MinorAccident, ReportStatus::Pending);
        seed(&store, actor.barangay_id(), ReportCategory::MinorAccident, ReportStatus::Resolved);
        seed(&store, actor.barangay_id(), ReportCategory::RoadCondition, ReportStatus::UnderReview);
        seed(&store, BarangayId::random(), ReportCategory::MinorAccident, ReportStatus::Pending);

        let service = DashboardService::new(store.clone(), store, Arc::new(LinearRiskScoring));
        let snapshot = service.dashboard(&actor).await.expect("dashboard");

        assert_eq!(snapshot.barangay.name, "San Isidro");
        assert_eq!(snapshot.counts.total, 3);
        assert_eq!(snapshot.counts.pending, 2);
        assert_eq!(snapshot.counts.urgent, 2);
        assert_eq!(snapshot.counts.minor_accidents, 2);
        assert_eq!(snapshot.score.risk, 16);
        assert_eq!(snapshot.score.safety, 84);
    }

    #[rstest]
    #[tokio::test]
    async fn scoring_strategy_is_pluggable() {
        let (store, actor) = setup();
        let service = DashboardService::new(store.clone(), store, Arc::new(FlatScoring));
        let snapshot = service.dashboard(&actor).await.expect("dashboard");
        assert_eq!(snapshot.score.risk, 7);
    }

    #[rstest]
    #[tokio::test]
    async fn residents_are_refused() {
        let (store, actor) = setup();
        let resident = Actor::new(actor.user_id(), UserRole::Resident, actor.barangay_id());
        let service = DashboardService::new(store.clone(), store, Arc::new(LinearRiskScoring));
        let err = service.dashboard(&resident).await.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
