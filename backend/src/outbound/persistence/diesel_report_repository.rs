//! PostgreSQL-backed `ReportRepository` implementation using Diesel ORM.
//!
//! Report writes and their audit rows share one transaction. Updates carry a
//! `WHERE status = expected` guard; when it matches no row the adapter
//! re-reads the report to tell a lost race from a missing report.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{ReportChange, ReportRepository, ReportRepositoryError};
use crate::domain::{
    AuditEntry, BarangayId, DashboardCounts, Report, ReportCategory, ReportFilter, ReportId,
    ReportStatus, Severity,
};

use super::diesel_helpers::{self, DieselErrorMapping, NoDuplicate, collect_rows};
use super::models::{AuditRow, NewAuditRow, ReportRecord, ReportRow};
use super::pool::{DbPool, PoolError};
use super::schema::{report_audit_log, reports};

/// Diesel-backed implementation of the report repository port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReportRepositoryError {
    diesel_helpers::map_pool_error(error, ReportRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReportRepositoryError {
    diesel_helpers::map_diesel_error(
        error,
        DieselErrorMapping {
            query: ReportRepositoryError::query,
            connection: ReportRepositoryError::connection,
            duplicate: None::<NoDuplicate<ReportRepositoryError>>,
        },
    )
}

/// Inserts can only collide on the report code; ids are random.
fn map_insert_error(error: diesel::result::Error, code: &str) -> ReportRepositoryError {
    diesel_helpers::map_diesel_error(
        error,
        DieselErrorMapping {
            query: ReportRepositoryError::query,
            connection: ReportRepositoryError::connection,
            duplicate: Some(|| ReportRepositoryError::duplicate_code(code)),
        },
    )
}

fn convert_rows(rows: Vec<ReportRow>) -> Result<Vec<Report>, ReportRepositoryError> {
    collect_rows(
        rows.into_iter().map(Report::try_from),
        ReportRepositoryError::query,
    )
}

/// Escape `LIKE` metacharacters so user search text matches literally.
///
/// PostgreSQL's default `LIKE` escape character is the backslash.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Build the boxed query for one page of `filter`, over-fetching one row so
/// the caller can tell whether another page exists.
fn filtered_page(filter: &ReportFilter) -> reports::BoxedQuery<'static, Pg> {
    let mut query = reports::table
        .filter(reports::barangay_id.eq(*filter.barangay_id.as_uuid()))
        .into_boxed();

    if !filter.include_archived {
        query = query.filter(reports::is_archived.eq(false));
    }
    if let Some(status) = filter.status {
        query = query.filter(reports::status.eq(status.as_str()));
    }
    if let Some(severity) = filter.severity {
        query = query.filter(reports::severity.eq(severity.as_str()));
    }
    if let Some(category) = filter.category {
        query = query.filter(reports::category.eq(category.as_str()));
    }
    if let Some(assignee) = filter.assigned_to {
        query = query.filter(reports::assigned_to.eq(*assignee.as_uuid()));
    }
    if let Some(reporter) = filter.reported_by {
        query = query.filter(reports::reported_by.eq(*reporter.as_uuid()));
    }
    if let Some(from) = filter.created_from {
        query = query.filter(reports::created_at.ge(from));
    }
    if let Some(to) = filter.created_to {
        query = query.filter(reports::created_at.le(to));
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        query = query.filter(
            reports::code
                .ilike(pattern.clone())
                .or(reports::location.ilike(pattern.clone()))
                .or(reports::description.ilike(pattern)),
        );
    }
    if let Some(cursor) = filter.after {
        query = query.filter(
            reports::created_at.lt(cursor.created_at).or(reports::created_at
                .eq(cursor.created_at)
                .and(reports::id.lt(cursor.id))),
        );
    }

    let fetch = i64::try_from(filter.limit.saturating_add(1)).unwrap_or(i64::MAX);
    query
        .order((reports::created_at.desc(), reports::id.desc()))
        .limit(fetch)
}

/// Explain why a guarded update touched no row.
async fn explain_skipped_update<C>(conn: &mut C, change: &ReportChange) -> ReportRepositoryError
where
    C: AsyncConnection<Backend = Pg> + Send,
{
    let report_id = change.report.id;
    let current = reports::table
        .filter(reports::id.eq(*report_id.as_uuid()))
        .select(reports::status)
        .first::<String>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(stored)) => match stored.parse::<ReportStatus>() {
            Ok(actual) => ReportRepositoryError::status_mismatch(change.expected_status, actual),
            Err(err) => ReportRepositoryError::query(format!("reports.status: {err}")),
        },
        Ok(None) => ReportRepositoryError::not_found(report_id),
        Err(err) => err,
    }
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn insert(&self, report: &Report, audit: &AuditEntry) -> Result<(), ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record = ReportRecord::from(report);
        let audit_row = NewAuditRow::from(audit);

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(reports::table)
                    .values(&record)
                    .execute(conn)
                    .await?;
                diesel::insert_into(report_audit_log::table)
                    .values(&audit_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_insert_error(err, report.code.as_str()))
    }

    async fn find_by_id(
        &self,
        barangay_id: &BarangayId,
        report_id: &ReportId,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reports::table
            .filter(reports::id.eq(*report_id.as_uuid()))
            .filter(reports::barangay_id.eq(*barangay_id.as_uuid()))
            .select(ReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Report::try_from)
            .transpose()
            .map_err(ReportRepositoryError::query)
    }

    async fn apply_change(&self, change: &ReportChange) -> Result<(), ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record = ReportRecord::from(&change.report);
        let audit_row = NewAuditRow::from(&change.audit);
        let report_id: Uuid = *change.report.id.as_uuid();
        let expected = change.expected_status.as_str();

        let applied = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(
                        reports::table
                            .filter(reports::id.eq(report_id))
                            .filter(reports::status.eq(expected)),
                    )
                    .set(&record)
                    .execute(conn)
                    .await?;
                    if updated == 0 {
                        return Ok(false);
                    }
                    diesel::insert_into(report_audit_log::table)
                        .values(&audit_row)
                        .execute(conn)
                        .await?;
                    Ok(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if applied {
            return Ok(());
        }
        debug!(%report_id, expected, "guarded report update matched no row");
        Err(explain_skipped_update(&mut conn, change).await)
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReportRow> = filtered_page(filter)
            .select(ReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows)
    }

    async fn history(&self, report_id: &ReportId) -> Result<Vec<AuditEntry>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AuditRow> = report_audit_log::table
            .filter(report_audit_log::report_id.eq(*report_id.as_uuid()))
            .order((report_audit_log::created_at.asc(), report_audit_log::id.asc()))
            .select(AuditRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(
            rows.into_iter().map(AuditEntry::try_from),
            ReportRepositoryError::query,
        )
    }

    async fn dashboard_counts(
        &self,
        barangay_id: &BarangayId,
    ) -> Result<DashboardCounts, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let groups: Vec<(String, String, String, i64)> = reports::table
            .filter(reports::barangay_id.eq(*barangay_id.as_uuid()))
            .group_by((reports::status, reports::severity, reports::category))
            .select((
                reports::status,
                reports::severity,
                reports::category,
                diesel::dsl::count_star(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        groups.into_iter().try_fold(
            DashboardCounts::default(),
            |mut counts, (status, severity, category, n)| {
                let status = status
                    .parse::<ReportStatus>()
                    .map_err(|err| ReportRepositoryError::query(format!("reports.status: {err}")))?;
                let severity = severity.parse::<Severity>().map_err(|err| {
                    ReportRepositoryError::query(format!("reports.severity: {err}"))
                })?;
                let category = category.parse::<ReportCategory>().map_err(|err| {
                    ReportRepositoryError::query(format!("reports.category: {err}"))
                })?;
                counts.add(status, severity, category, u64::try_from(n).unwrap_or(0));
                Ok::<_, ReportRepositoryError>(counts)
            },
        )
    }

    async fn scheduled_deletions(
        &self,
        barangay_id: &BarangayId,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<Report>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReportRow> = reports::table
            .filter(reports::barangay_id.eq(*barangay_id.as_uuid()))
            .filter(reports::is_archived.eq(true))
            .filter(reports::scheduled_deletion.le(due_before))
            .order((reports::scheduled_deletion.asc(), reports::id.asc()))
            .select(ReportRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        convert_rows(rows)
    }
}
