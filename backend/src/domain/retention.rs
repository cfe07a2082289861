//! Archive retention policy and the scheduled-deletion window.

use chrono::{DateTime, Duration, Months, Utc};

/// Retention period applied when no configuration overrides it.
pub const DEFAULT_RETENTION_YEARS: u32 = 5;
/// Scheduled-deletion look-ahead applied when the caller gives none.
pub const DEFAULT_DELETION_WINDOW_DAYS: u32 = 90;
const MAX_RETENTION_YEARS: u32 = 50;
const MAX_DELETION_WINDOW_DAYS: u32 = 3650;

/// Retention configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetentionError {
    /// Retention years outside the supported range.
    #[error("retention years must be between 1 and {max}")]
    InvalidYears {
        /// Largest supported value.
        max: u32,
    },
    /// Look-ahead days outside the supported range.
    #[error("withinDays must be between 0 and {max}")]
    InvalidWindow {
        /// Largest supported value.
        max: u32,
    },
    /// The deadline does not fit in the calendar.
    #[error("retention deadline overflows the supported date range")]
    Overflow,
}

/// How long archived reports are kept before they become due for deletion.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use transport_portal::domain::RetentionPolicy;
///
/// let policy = RetentionPolicy::default();
/// let archived = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
/// let deadline = policy.deadline_from(archived).expect("in range");
/// assert_eq!(deadline, Utc.with_ymd_and_hms(2029, 2, 28, 12, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    years: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            years: DEFAULT_RETENTION_YEARS,
        }
    }
}

impl RetentionPolicy {
    /// Build a policy keeping archives for `years` calendar years.
    pub fn new(years: u32) -> Result<Self, RetentionError> {
        if !(1..=MAX_RETENTION_YEARS).contains(&years) {
            return Err(RetentionError::InvalidYears {
                max: MAX_RETENTION_YEARS,
            });
        }
        Ok(Self { years })
    }

    /// Configured retention in years.
    #[must_use]
    pub const fn years(&self) -> u32 {
        self.years
    }

    /// Deletion deadline for a report archived at `archived_at`.
    ///
    /// Calendar arithmetic clamps to the end of the month, so a report
    /// archived on 29 February is due on 28 February.
    pub fn deadline_from(&self, archived_at: DateTime<Utc>) -> Result<DateTime<Utc>, RetentionError> {
        archived_at
            .checked_add_months(Months::new(self.years * 12))
            .ok_or(RetentionError::Overflow)
    }
}

/// Look-ahead used by the scheduled-deletion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionWindow {
    days: u32,
}

impl Default for DeletionWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_DELETION_WINDOW_DAYS,
        }
    }
}

impl DeletionWindow {
    /// Build a window of `days` days; zero lists only overdue archives.
    pub fn new(days: u32) -> Result<Self, RetentionError> {
        if days > MAX_DELETION_WINDOW_DAYS {
            return Err(RetentionError::InvalidWindow {
                max: MAX_DELETION_WINDOW_DAYS,
            });
        }
        Ok(Self { days })
    }

    /// Window length in days.
    #[must_use]
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// Latest deadline included when evaluated at `now`.
    #[must_use]
    pub fn horizon(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(i64::from(self.days))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 9, 30, 0)
            .single()
            .expect("valid date")
    }

    #[rstest]
    #[case(5, at(2026, 10, 16), at(2031, 10, 16))]
    #[case(1, at(2026, 1, 31), at(2027, 1, 31))]
    #[case(5, at(2028, 2, 29), at(2033, 2, 28))]
    fn deadlines_add_calendar_years(
        #[case] years: u32,
        #[case] archived: DateTime<Utc>,
        #[case] expected: DateTime<Utc>,
    ) {
        let policy = RetentionPolicy::new(years).expect("valid policy");
        assert_eq!(policy.deadline_from(archived), Ok(expected));
    }

    #[rstest]
    #[case(0)]
    #[case(51)]
    fn out_of_range_years_are_rejected(#[case] years: u32) {
        assert!(RetentionPolicy::new(years).is_err());
    }

    #[rstest]
    fn default_policy_keeps_five_years() {
        assert_eq!(RetentionPolicy::default().years(), 5);
    }

    #[rstest]
    fn window_horizon_adds_days() {
        let window = DeletionWindow::new(30).expect("valid window");
        assert_eq!(window.horizon(at(2026, 1, 1)), at(2026, 1, 31));
    }

    #[rstest]
    fn oversized_windows_are_rejected() {
        assert_eq!(
            DeletionWindow::new(3651),
            Err(RetentionError::InvalidWindow { max: 3650 })
        );
    }
}
