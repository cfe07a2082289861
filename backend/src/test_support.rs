//! Test doubles shared by unit tests and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature so the
//! `tests/` suites can reuse the same in-memory adapters.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AgencyRepository, AgencyRepositoryError, BarangayRepository, BarangayRepositoryError,
    ReportChange, ReportRepository, ReportRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Agency, AgencyId, AuditEntry, Barangay, BarangayId, DashboardCounts, Report, ReportFilter,
    ReportId, ReportStatus, UserAccount, UserId,
};

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    /// Freeze the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct StoreState {
    reports: BTreeMap<ReportId, Report>,
    audit: Vec<AuditEntry>,
    agencies: HashMap<AgencyId, Agency>,
    users: HashMap<UserId, UserAccount>,
    barangays: HashMap<BarangayId, Barangay>,
    fail_audit_writes: bool,
    offline: bool,
}

/// In-memory implementation of the driven persistence ports.
///
/// Mutations stage the report write before the audit write and undo the
/// report write when the audit write fails, mirroring a rolled back
/// transaction.
#[derive(Default)]
pub struct InMemoryReportStore {
    state: Mutex<StoreState>,
}

impl InMemoryReportStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a barangay.
    pub fn seed_barangay(&self, barangay: Barangay) {
        self.state().barangays.insert(barangay.id, barangay);
    }

    /// Seed a user account.
    pub fn seed_user(&self, account: UserAccount) {
        self.state().users.insert(account.id, account);
    }

    /// Seed an agency.
    pub fn seed_agency(&self, agency: Agency) {
        self.state().agencies.insert(agency.id, agency);
    }

    /// Seed a report without writing an audit row.
    pub fn seed_report(&self, report: Report) {
        self.state().reports.insert(report.id, report);
    }

    /// Current stored state of a report.
    pub fn report(&self, id: &ReportId) -> Option<Report> {
        self.state().reports.get(id).cloned()
    }

    /// Audit rows for a report in insertion order.
    pub fn audit_for(&self, id: &ReportId) -> Vec<AuditEntry> {
        self.state()
            .audit
            .iter()
            .filter(|entry| entry.report_id == *id)
            .cloned()
            .collect()
    }

    /// Make every following audit write fail.
    pub fn fail_audit_writes(&self, fail: bool) {
        self.state().fail_audit_writes = fail;
    }

    /// Make every following call fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Change a report's status behind the service's back.
    pub fn force_status(&self, id: &ReportId, status: ReportStatus) {
        if let Some(report) = self.state().reports.get_mut(id) {
            report.status = status;
        }
    }

    fn append_audit(state: &mut StoreState, audit: &AuditEntry) -> Result<(), ReportRepositoryError> {
        if state.fail_audit_writes {
            return Err(ReportRepositoryError::query("audit log write failed"));
        }
        state.audit.push(audit.clone());
        Ok(())
    }

    fn online(state: &StoreState) -> Result<(), String> {
        if state.offline {
            Err("store offline".to_owned())
        } else {
            Ok(())
        }
    }
}

fn matches_filter(report: &Report, filter: &ReportFilter) -> bool {
    let search_hit = filter.search.as_deref().is_none_or(|needle| {
        let needle = needle.to_lowercase();
        [
            report.code.as_str(),
            report.location.as_str(),
            report.description.as_str(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    });
    let after_cursor = filter.after.is_none_or(|cursor| {
        (report.created_at, *report.id.as_uuid()) < (cursor.created_at, cursor.id)
    });

    report.barangay_id == filter.barangay_id
        && (filter.include_archived || !report.is_archived())
        && filter.status.is_none_or(|status| report.status == status)
        && filter.severity.is_none_or(|severity| report.severity == severity)
        && filter.category.is_none_or(|category| report.category == category)
        && filter
            .assigned_to
            .is_none_or(|user| report.assigned_to == Some(user))
        && filter.reported_by.is_none_or(|user| report.reported_by == user)
        && filter.created_from.is_none_or(|from| report.created_at >= from)
        && filter.created_to.is_none_or(|to| report.created_at <= to)
        && search_hit
        && after_cursor
}

#[async_trait]
impl ReportRepository for InMemoryReportStore {
    async fn insert(&self, report: &Report, audit: &AuditEntry) -> Result<(), ReportRepositoryError> {
        let mut state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        if state.reports.contains_key(&report.id) {
            return Err(ReportRepositoryError::query("duplicate report id"));
        }
        if state.reports.values().any(|existing| existing.code == report.code) {
            return Err(ReportRepositoryError::duplicate_code(report.code.as_str()));
        }
        state.reports.insert(report.id, report.clone());
        if let Err(err) = Self::append_audit(&mut state, audit) {
            state.reports.remove(&report.id);
            return Err(err);
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        barangay_id: &BarangayId,
        report_id: &ReportId,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        Ok(state
            .reports
            .get(report_id)
            .filter(|report| report.barangay_id == *barangay_id)
            .cloned())
    }

    async fn apply_change(&self, change: &ReportChange) -> Result<(), ReportRepositoryError> {
        let mut state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        let id = change.report.id;
        let actual = state
            .reports
            .get(&id)
            .map(|report| report.status)
            .ok_or_else(|| ReportRepositoryError::not_found(id))?;
        if actual != change.expected_status {
            return Err(ReportRepositoryError::status_mismatch(
                change.expected_status,
                actual,
            ));
        }

        let previous = state.reports.insert(id, change.report.clone());
        if let Err(err) = Self::append_audit(&mut state, &change.audit) {
            if let Some(previous) = previous {
                state.reports.insert(id, previous);
            }
            return Err(err);
        }
        Ok(())
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, ReportRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        let mut rows: Vec<Report> = state
            .reports
            .values()
            .filter(|report| matches_filter(report, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.created_at, b.id.as_uuid()).cmp(&(a.created_at, a.id.as_uuid()))
        });
        rows.truncate(filter.limit + 1);
        Ok(rows)
    }

    async fn history(&self, report_id: &ReportId) -> Result<Vec<AuditEntry>, ReportRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        Ok(state
            .audit
            .iter()
            .filter(|entry| entry.report_id == *report_id)
            .cloned()
            .collect())
    }

    async fn dashboard_counts(
        &self,
        barangay_id: &BarangayId,
    ) -> Result<DashboardCounts, ReportRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        Ok(DashboardCounts::tally(
            state
                .reports
                .values()
                .filter(|report| report.barangay_id == *barangay_id),
        ))
    }

    async fn scheduled_deletions(
        &self,
        barangay_id: &BarangayId,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<Report>, ReportRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(ReportRepositoryError::connection)?;
        let mut rows: Vec<Report> = state
            .reports
            .values()
            .filter(|report| {
                report.barangay_id == *barangay_id
                    && report
                        .archive
                        .is_some_and(|archive| archive.scheduled_deletion <= due_before)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|report| report.archive.map(|archive| archive.scheduled_deletion));
        Ok(rows)
    }
}

#[async_trait]
impl AgencyRepository for InMemoryReportStore {
    async fn insert(&self, agency: &Agency) -> Result<(), AgencyRepositoryError> {
        let mut state = self.state();
        Self::online(&state).map_err(AgencyRepositoryError::connection)?;
        let taken = state
            .agencies
            .values()
            .any(|existing| existing.name.eq_ignore_ascii_case(&agency.name));
        if taken {
            return Err(AgencyRepositoryError::duplicate_name(agency.name.clone()));
        }
        state.agencies.insert(agency.id, agency.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AgencyId) -> Result<Option<Agency>, AgencyRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(AgencyRepositoryError::connection)?;
        Ok(state.agencies.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Agency>, AgencyRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(AgencyRepositoryError::connection)?;
        let mut agencies: Vec<Agency> = state.agencies.values().cloned().collect();
        agencies.sort_by_key(|agency| agency.name.to_lowercase());
        Ok(agencies)
    }
}

#[async_trait]
impl UserRepository for InMemoryReportStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(UserRepositoryError::connection)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(UserRepositoryError::connection)?;
        Ok(state
            .users
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError> {
        let mut state = self.state();
        Self::online(&state).map_err(UserRepositoryError::connection)?;
        if state
            .users
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(UserRepositoryError::duplicate_username(account.username.clone()));
        }
        state.users.insert(account.id, account.clone());
        Ok(())
    }
}

#[async_trait]
impl BarangayRepository for InMemoryReportStore {
    async fn insert(&self, barangay: &Barangay) -> Result<(), BarangayRepositoryError> {
        let mut state = self.state();
        Self::online(&state).map_err(BarangayRepositoryError::connection)?;
        if state
            .barangays
            .values()
            .any(|existing| existing.name == barangay.name)
        {
            return Err(BarangayRepositoryError::duplicate_name(barangay.name.clone()));
        }
        state.barangays.insert(barangay.id, barangay.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &BarangayId,
    ) -> Result<Option<Barangay>, BarangayRepositoryError> {
        let state = self.state();
        Self::online(&state).map_err(BarangayRepositoryError::connection)?;
        Ok(state.barangays.get(id).cloned())
    }
}
