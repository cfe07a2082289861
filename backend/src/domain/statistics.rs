//! Dashboard counters and the safety score.
//!
//! The counters are plain predicates over report rows. [`DashboardCounts::tally`]
//! is the reference definition; database adapters compute the same numbers
//! with one aggregate query.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Report, ReportCategory, ReportStatus, Severity};

/// Aggregate report counts for one barangay.
///
/// Archived reports only contribute to `archived`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    /// Non-archived reports.
    pub total: u64,
    /// Pending or under review.
    pub pending: u64,
    /// High or critical severity and still open.
    pub urgent: u64,
    /// Assigned or in progress.
    pub in_progress: u64,
    /// Resolved.
    pub resolved: u64,
    /// Referred to an agency.
    pub referred: u64,
    /// Archived.
    pub archived: u64,
    /// Minor accidents, used by the risk score.
    pub minor_accidents: u64,
}

impl DashboardCounts {
    /// Count `reports` in memory.
    #[must_use]
    pub fn tally<'a>(reports: impl IntoIterator<Item = &'a Report>) -> Self {
        reports
            .into_iter()
            .fold(Self::default(), |mut counts, report| {
                counts.add(report.status, report.severity, report.category, 1);
                counts
            })
    }

    /// Add `n` reports sharing one status, severity and category.
    ///
    /// Aggregate queries group by those three columns and feed each group
    /// through here.
    pub fn add(
        &mut self,
        status: ReportStatus,
        severity: Severity,
        category: ReportCategory,
        n: u64,
    ) {
        if status == ReportStatus::Archived {
            self.archived += n;
            return;
        }
        let when = |hit: bool| if hit { n } else { 0 };
        self.total += n;
        self.pending += when(status.is_pending());
        self.urgent += when(severity.is_urgent() && !status.is_closed());
        self.in_progress += when(matches!(
            status,
            ReportStatus::Assigned | ReportStatus::InProgress
        ));
        self.resolved += when(status == ReportStatus::Resolved);
        self.referred += when(status == ReportStatus::Referred);
        self.minor_accidents += when(category == ReportCategory::MinorAccident);
    }
}

/// Risk and safety scores on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SafetyScore {
    /// Higher is riskier.
    pub risk: u8,
    /// `100 - risk`.
    pub safety: u8,
}

impl SafetyScore {
    /// Build a score from a risk value, clamping to 100.
    #[must_use]
    pub fn from_risk(risk: u64) -> Self {
        let risk = u8::try_from(risk.min(100)).unwrap_or(100);
        Self {
            risk,
            safety: 100 - risk,
        }
    }
}

/// Strategy turning dashboard counts into a safety score.
pub trait SafetyScoring: Send + Sync {
    /// Score the counts.
    fn score(&self, counts: &DashboardCounts) -> SafetyScore;
}

/// `risk = min(100, total * 2 + minor_accidents * 5)`.
///
/// # Examples
/// ```
/// use transport_portal::domain::{DashboardCounts, LinearRiskScoring, SafetyScoring};
///
/// let counts = DashboardCounts { total: 10, minor_accidents: 3, ..DashboardCounts::default() };
/// let score = LinearRiskScoring.score(&counts);
/// assert_eq!((score.risk, score.safety), (35, 65));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearRiskScoring;

impl SafetyScoring for LinearRiskScoring {
    fn score(&self, counts: &DashboardCounts) -> SafetyScore {
        let risk = counts
            .total
            .saturating_mul(2)
            .saturating_add(counts.minor_accidents.saturating_mul(5));
        SafetyScore::from_risk(risk)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{BarangayId, ReportDraft, ReportId, Severity, UserId};
    use chrono::Utc;
    use rstest::rstest;

    fn report(category: ReportCategory, severity: Severity, status: ReportStatus) -> Report {
        let draft = ReportDraft::new(category, severity, "Rizal Ave", "Test report")
            .expect("valid draft");
        let mut report = Report::file(
            ReportId::random(),
            draft,
            UserId::random(),
            BarangayId::random(),
            Utc::now(),
        );
        report.status = status;
        report
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(10, 3, 35)]
    #[case(40, 5, 100)]
    #[case(u64::MAX, u64::MAX, 100)]
    fn linear_risk_formula(#[case] total: u64, #[case] minor: u64, #[case] risk: u8) {
        let counts = DashboardCounts {
            total,
            minor_accidents: minor,
            ..DashboardCounts::default()
        };
        let score = LinearRiskScoring.score(&counts);
        assert_eq!(score.risk, risk);
        assert_eq!(score.safety, 100 - risk);
    }

    #[rstest]
    fn tally_applies_each_predicate() {
        let reports = vec![
            report(ReportCategory::MinorAccident, Severity::High, ReportStatus::Pending),
            report(ReportCategory::RoadCondition, Severity::Low, ReportStatus::UnderReview),
            report(ReportCategory::RoadCondition, Severity::Critical, ReportStatus::Resolved),
            report(ReportCategory::TrafficIncident, Severity::High, ReportStatus::Referred),
            report(ReportCategory::Other, Severity::Medium, ReportStatus::InProgress),
        ];
        let counts = DashboardCounts::tally(&reports);
        assert_eq!(
            counts,
            DashboardCounts {
                total: 5,
                pending: 2,
                urgent: 2,
                in_progress: 1,
                resolved: 1,
                referred: 1,
                archived: 0,
                minor_accidents: 1,
            }
        );
    }

    #[rstest]
    fn grouped_rows_add_their_multiplicity() {
        let mut counts = DashboardCounts::default();
        counts.add(ReportStatus::InProgress, Severity::Critical, ReportCategory::MinorAccident, 3);
        counts.add(ReportStatus::Archived, Severity::Critical, ReportCategory::MinorAccident, 4);

        assert_eq!(counts.total, 3);
        assert_eq!(counts.in_progress, 3);
        assert_eq!(counts.urgent, 3);
        assert_eq!(counts.minor_accidents, 3);
        assert_eq!(counts.archived, 4);
    }
}
