//! Report lifecycle domain service.
//!
//! Implements the report command and query driving ports. Every mutation
//! reads the report, checks the actor and the transition table, then hands a
//! guarded [`ReportChange`] to the repository so the status write and its
//! audit row land together or not at all.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Page;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AgencyRepository, AgencyRepositoryError, ArchiveRequest, AssignRequest, DeletionSchedule,
    ReferRequest, ReportChange, ReportCommand, ReportQuery, ReportRepository,
    ReportRepositoryError, TransitionRequest, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Actor, ArchiveRecord, AuditAction, AuditEntry, DeletionWindow, Error, ReferralSnapshot,
    Report, ReportCursor, ReportDraft, ReportFilter, ReportFilterInput, ReportId, ReportStatus,
    RetentionPolicy, UserRole,
};

const NOTES_MAX: usize = 2000;
const REASON_MAX: usize = 1000;
/// Codes carry six hex digits of the id, so same-day filings can collide.
const CODE_ATTEMPTS: usize = 3;

pub(crate) fn map_report_error(error: ReportRepositoryError) -> Error {
    match error {
        ReportRepositoryError::Connection { message } => {
            Error::store_unavailable("report store", &message)
        }
        ReportRepositoryError::Query { message } => {
            Error::internal(format!("report repository error: {message}"))
        }
        ReportRepositoryError::NotFound { report_id } => report_not_found(&report_id),
        ReportRepositoryError::StatusMismatch { expected, actual } => {
            status_conflict(expected, actual)
        }
        ReportRepositoryError::DuplicateCode { code } => {
            Error::conflict("could not allocate a report code; retry the submission")
                .with_details(json!({ "code": code }))
        }
    }
}

fn map_agency_error(error: AgencyRepositoryError) -> Error {
    match error {
        AgencyRepositoryError::Connection { message } => {
            Error::store_unavailable("agency store", &message)
        }
        AgencyRepositoryError::Query { message }
        | AgencyRepositoryError::DuplicateName { name: message } => {
            Error::internal(format!("agency repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::store_unavailable("user store", &message)
        }
        UserRepositoryError::Query { message }
        | UserRepositoryError::DuplicateUsername { username: message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

fn report_not_found(report_id: &ReportId) -> Error {
    Error::not_found(format!("report {report_id} not found"))
}

fn status_conflict(expected: ReportStatus, actual: ReportStatus) -> Error {
    Error::conflict(format!(
        "report status is {actual}, expected {expected}"
    ))
    .with_details(json!({
        "expected": expected,
        "actual": actual,
    }))
}

fn invalid_transition(
    from: ReportStatus,
    to: Option<ReportStatus>,
    message: impl Into<String>,
) -> Error {
    Error::invalid_transition(message).with_details(json!({
        "from": from,
        "to": to,
    }))
}

fn normalise_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, Error> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max {
        return Err(
            Error::invalid_request(format!("{field} must be at most {max} characters"))
                .with_details(json!({ "field": field })),
        );
    }
    Ok(Some(trimmed.to_owned()))
}

fn generic_transition_check(from: ReportStatus, to: ReportStatus) -> Result<(), Error> {
    match to {
        ReportStatus::Archived => Err(invalid_transition(
            from,
            Some(to),
            "use the archive operation to archive a report",
        )),
        ReportStatus::Referred => Err(invalid_transition(
            from,
            Some(to),
            "use the referral operation to refer a report",
        )),
        _ if from == to => Err(invalid_transition(
            from,
            Some(to),
            format!("report is already {to}"),
        )),
        _ if !from.can_transition_to(to) => Err(invalid_transition(
            from,
            Some(to),
            format!("cannot move a report from {from} to {to}"),
        )),
        _ => Ok(()),
    }
}

fn tanod_may_apply(actor: &Actor, report: &Report, to: ReportStatus) -> bool {
    report.assigned_to == Some(actor.user_id())
        && matches!(
            (report.status, to),
            (ReportStatus::Assigned, ReportStatus::InProgress)
                | (ReportStatus::InProgress, ReportStatus::Resolved)
        )
}

/// Report lifecycle service implementing [`ReportCommand`] and [`ReportQuery`].
#[derive(Clone)]
pub struct ReportLifecycleService<R, A, U> {
    reports: Arc<R>,
    agencies: Arc<A>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
    retention: RetentionPolicy,
    deletion_window: DeletionWindow,
}

impl<R, A, U> ReportLifecycleService<R, A, U> {
    /// Create a service with the default retention policy and window.
    pub fn new(reports: Arc<R>, agencies: Arc<A>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reports,
            agencies,
            users,
            clock,
            retention: RetentionPolicy::default(),
            deletion_window: DeletionWindow::default(),
        }
    }

    /// Override the archive retention policy.
    #[must_use]
    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Override the default scheduled-deletion look-ahead.
    #[must_use]
    pub fn with_deletion_window(mut self, window: DeletionWindow) -> Self {
        self.deletion_window = window;
        self
    }
}

impl<R, A, U> ReportLifecycleService<R, A, U>
where
    R: ReportRepository,
    A: AgencyRepository,
    U: UserRepository,
{
    /// Load a report the actor may see.
    async fn load(&self, actor: &Actor, report_id: &ReportId) -> Result<Report, Error> {
        let report = self
            .reports
            .find_by_id(&actor.barangay_id(), report_id)
            .await
            .map_err(map_report_error)?
            .ok_or_else(|| report_not_found(report_id))?;

        if actor.role() == UserRole::Resident && report.reported_by != actor.user_id() {
            return Err(report_not_found(report_id));
        }
        Ok(report)
    }

    /// Persist `next` guarded by `from`, together with one audit row.
    async fn commit(
        &self,
        actor: &Actor,
        from: ReportStatus,
        next: Report,
        action: AuditAction,
        notes: Option<String>,
    ) -> Result<Report, Error> {
        let audit = AuditEntry::record(
            next.id,
            action,
            Some(from),
            next.status,
            actor.user_id(),
            notes,
            next.updated_at,
        );
        let change = ReportChange {
            report: next,
            expected_status: from,
            audit,
        };

        if let Err(err) = self.reports.apply_change(&change).await {
            if let ReportRepositoryError::StatusMismatch { expected, actual } = &err {
                warn!(
                    report_id = %change.report.id,
                    expected = %expected,
                    actual = %actual,
                    actor = %actor.user_id(),
                    "concurrent report modification"
                );
            }
            return Err(map_report_error(err));
        }

        info!(
            report_id = %change.report.id,
            from = %from,
            to = %change.report.status,
            actor = %actor.user_id(),
            action = action.as_str(),
            "report updated"
        );
        Ok(change.report)
    }

    fn reject(actor: &Actor, report: &Report, error: Error) -> Error {
        warn!(
            report_id = %report.id,
            from = %report.status,
            actor = %actor.user_id(),
            reason = error.message(),
            "report change rejected"
        );
        error
    }
}

#[async_trait]
impl<R, A, U> ReportCommand for ReportLifecycleService<R, A, U>
where
    R: ReportRepository,
    A: AgencyRepository,
    U: UserRepository,
{
    async fn submit_report(&self, actor: &Actor, draft: ReportDraft) -> Result<Report, Error> {
        if actor.role() == UserRole::Resident && !actor.is_verified() {
            return Err(Error::forbidden(
                "resident accounts must be verified before filing reports",
            ));
        }

        let now = self.clock.utc();
        let mut attempt = 1;
        let report = loop {
            let report = Report::file(
                ReportId::random(),
                draft.clone(),
                actor.user_id(),
                actor.barangay_id(),
                now,
            );
            let audit = AuditEntry::record(
                report.id,
                AuditAction::Created,
                None,
                report.status,
                actor.user_id(),
                None,
                now,
            );
            match self.reports.insert(&report, &audit).await {
                Ok(()) => break report,
                Err(ReportRepositoryError::DuplicateCode { code }) if attempt < CODE_ATTEMPTS => {
                    warn!(%code, attempt, "report code collision; drawing a new id");
                    attempt += 1;
                }
                Err(err) => return Err(map_report_error(err)),
            }
        };

        info!(
            report_id = %report.id,
            code = %report.code,
            to = %report.status,
            actor = %actor.user_id(),
            "report submitted"
        );
        Ok(report)
    }

    async fn transition(
        &self,
        actor: &Actor,
        request: TransitionRequest,
    ) -> Result<Report, Error> {
        if actor.role() == UserRole::Resident {
            return Err(Error::forbidden("residents cannot change report status"));
        }
        let notes = normalise_text("notes", request.notes, NOTES_MAX)?;
        let current = self.load(actor, &request.report_id).await?;
        let (from, to) = (current.status, request.target);

        if let Some(expected) = request.expected_status {
            if expected != from {
                return Err(Self::reject(actor, &current, status_conflict(expected, from)));
            }
        }
        generic_transition_check(from, to).map_err(|err| Self::reject(actor, &current, err))?;

        if actor.role() == UserRole::Tanod && !tanod_may_apply(actor, &current, to) {
            return Err(Error::forbidden(
                "tanod accounts may only progress reports assigned to them",
            ));
        }

        let mut next = current;
        next.status = to;
        next.updated_at = self.clock.utc();
        if to == ReportStatus::Resolved {
            next.resolution_notes.clone_from(&notes);
        } else if from == ReportStatus::Resolved {
            next.resolution_notes = None;
        }

        self.commit(actor, from, next, AuditAction::StatusChanged, notes)
            .await
    }

    async fn assign(&self, actor: &Actor, request: AssignRequest) -> Result<Report, Error> {
        actor.require_staff()?;
        let notes = normalise_text("notes", request.notes, NOTES_MAX)?;
        let current = self.load(actor, &request.report_id).await?;
        let from = current.status;
        if !from.can_assign() {
            return Err(Self::reject(
                actor,
                &current,
                invalid_transition(
                    from,
                    Some(ReportStatus::Assigned),
                    format!("a {from} report cannot be assigned"),
                ),
            ));
        }

        let assignee = self
            .users
            .find_by_id(&request.assignee)
            .await
            .map_err(map_user_error)?
            .filter(|account| {
                account.barangay_id == actor.barangay_id()
                    && account.is_verified
                    && matches!(account.role, UserRole::Tanod | UserRole::Employee)
            })
            .ok_or_else(|| {
                Error::invalid_request("assignee must be an active tanod or employee of this barangay")
                    .with_details(json!({ "field": "assigneeId" }))
            })?;

        let audit_note = match notes {
            Some(notes) => format!("assigned to {}: {notes}", assignee.username),
            None => format!("assigned to {}", assignee.username),
        };

        let mut next = current;
        next.status = ReportStatus::Assigned;
        next.assigned_to = Some(assignee.id);
        next.updated_at = self.clock.utc();

        self.commit(actor, from, next, AuditAction::Assigned, Some(audit_note))
            .await
    }

    async fn refer(&self, actor: &Actor, request: ReferRequest) -> Result<Report, Error> {
        actor.require_staff()?;
        let reason = normalise_text("reason", Some(request.reason), REASON_MAX)?.ok_or_else(|| {
            Error::invalid_request("reason must not be empty")
                .with_details(json!({ "field": "reason" }))
        })?;
        let notes = normalise_text("notes", request.notes, NOTES_MAX)?;
        let current = self.load(actor, &request.report_id).await?;
        let from = current.status;
        if !from.can_refer() {
            return Err(Self::reject(
                actor,
                &current,
                invalid_transition(
                    from,
                    Some(ReportStatus::Referred),
                    format!("a {from} report cannot be referred"),
                ),
            ));
        }

        let agency = self
            .agencies
            .find_by_id(&request.agency_id)
            .await
            .map_err(map_agency_error)?
            .ok_or_else(|| Error::not_found(format!("agency {} not found", request.agency_id)))?;

        let now = self.clock.utc();
        let mut next = current;
        next.status = ReportStatus::Referred;
        next.referral = Some(ReferralSnapshot {
            agency_id: agency.id,
            contact: agency.contact_line(),
            agency_name: agency.name,
            reason,
            referred_at: now,
        });
        next.updated_at = now;

        self.commit(actor, from, next, AuditAction::Referred, notes).await
    }

    async fn archive(&self, actor: &Actor, request: ArchiveRequest) -> Result<Report, Error> {
        actor.require_admin()?;
        let notes = normalise_text("notes", request.notes, NOTES_MAX)?;
        let current = self.load(actor, &request.report_id).await?;
        let from = current.status;
        if !from.can_archive() {
            return Err(Self::reject(
                actor,
                &current,
                invalid_transition(
                    from,
                    Some(ReportStatus::Archived),
                    "only resolved or rejected reports can be archived",
                ),
            ));
        }

        let now = self.clock.utc();
        let scheduled_deletion = self
            .retention
            .deadline_from(now)
            .map_err(|err| Error::internal(format!("retention deadline: {err}")))?;

        let mut next = current;
        next.status = ReportStatus::Archived;
        next.archive = Some(ArchiveRecord {
            archived_at: now,
            archived_from: from,
            scheduled_deletion,
        });
        next.updated_at = now;

        self.commit(actor, from, next, AuditAction::Archived, notes)
            .await
    }

    async fn unarchive(&self, actor: &Actor, request: ArchiveRequest) -> Result<Report, Error> {
        actor.require_admin()?;
        let notes = normalise_text("notes", request.notes, NOTES_MAX)?;
        let current = self.load(actor, &request.report_id).await?;
        let from = current.status;
        let Some(archive) = current.archive.filter(|_| from == ReportStatus::Archived) else {
            return Err(Self::reject(
                actor,
                &current,
                invalid_transition(from, None, "report is not archived"),
            ));
        };

        let mut next = current;
        next.status = archive.archived_from;
        next.archive = None;
        next.updated_at = self.clock.utc();

        self.commit(actor, from, next, AuditAction::Unarchived, notes)
            .await
    }
}

#[async_trait]
impl<R, A, U> ReportQuery for ReportLifecycleService<R, A, U>
where
    R: ReportRepository,
    A: AgencyRepository,
    U: UserRepository,
{
    async fn report(&self, actor: &Actor, report_id: &ReportId) -> Result<Report, Error> {
        self.load(actor, report_id).await
    }

    async fn list_reports(
        &self,
        actor: &Actor,
        filter: ReportFilterInput,
    ) -> Result<Page<Report>, Error> {
        let filter = ReportFilter::for_actor(actor, filter).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
        })?;
        let rows = self.reports.list(&filter).await.map_err(map_report_error)?;
        Page::from_overfetch(rows, filter.limit, |report| ReportCursor {
            created_at: report.created_at,
            id: *report.id.as_uuid(),
        })
        .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))
    }

    async fn history(
        &self,
        actor: &Actor,
        report_id: &ReportId,
    ) -> Result<Vec<AuditEntry>, Error> {
        let report = self.load(actor, report_id).await?;
        self.reports
            .history(&report.id)
            .await
            .map_err(map_report_error)
    }

    async fn scheduled_deletions(
        &self,
        actor: &Actor,
        within_days: Option<u32>,
    ) -> Result<DeletionSchedule, Error> {
        actor.require_admin()?;
        let window = within_days
            .map(DeletionWindow::new)
            .transpose()
            .map_err(|err| {
                Error::invalid_request(err.to_string())
                    .with_details(json!({ "field": "withinDays" }))
            })?
            .unwrap_or(self.deletion_window);

        let due_before = window.horizon(self.clock.utc());
        let reports = self
            .reports
            .scheduled_deletions(&actor.barangay_id(), due_before)
            .await
            .map_err(map_report_error)?;

        Ok(DeletionSchedule {
            within_days: window.days(),
            due_before,
            reports,
        })
    }
}

#[cfg(test)]
#[path = "report_lifecycle_service_tests.rs"]
mod tests;
