//! External referral agencies.

use chrono::{DateTime, Utc};

use crate::domain::AgencyId;

const NAME_MAX: usize = 120;
const TEXT_MAX: usize = 120;
const SLA_MAX_HOURS: u32 = 720;

/// Validation failures for agency drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgencyValidationError {
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },
    /// A text field exceeded its column width.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
    /// The e-mail address is not plausibly valid.
    #[error("email must contain a single @ with text on both sides")]
    InvalidEmail,
    /// The SLA is zero or unreasonably long.
    #[error("responseTimeHours must be between 1 and {max}")]
    InvalidResponseTime {
        /// Largest accepted SLA.
        max: u32,
    },
}

impl AgencyValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
            Self::InvalidEmail => "email",
            Self::InvalidResponseTime { .. } => "responseTimeHours",
        }
    }
}

/// Validated input for registering an agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgencyDraft {
    name: String,
    agency_type: String,
    contact_person: String,
    contact_number: String,
    email: Option<String>,
    response_time_hours: u32,
}

/// Raw agency fields, as received from a caller.
#[derive(Debug, Clone, Copy)]
pub struct AgencyFields<'a> {
    /// Display name, unique case-insensitively.
    pub name: &'a str,
    /// Free-form classification such as "police".
    pub agency_type: &'a str,
    /// Person to call.
    pub contact_person: &'a str,
    /// Phone number.
    pub contact_number: &'a str,
    /// Optional e-mail address.
    pub email: Option<&'a str>,
    /// Promised response time in hours.
    pub response_time_hours: u32,
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, AgencyValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AgencyValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(AgencyValidationError::TooLong { field, max });
    }
    Ok(value.to_owned())
}

fn optional_email(value: Option<&str>) -> Result<Option<String>, AgencyValidationError> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(Some(value.to_owned()))
        }
        _ => Err(AgencyValidationError::InvalidEmail),
    }
}

impl AgencyDraft {
    /// Validate raw agency fields.
    ///
    /// # Examples
    /// ```
    /// use transport_portal::domain::{AgencyDraft, AgencyFields};
    ///
    /// let draft = AgencyDraft::new(AgencyFields {
    ///     name: "PNP Traffic Unit",
    ///     agency_type: "police",
    ///     contact_person: "PCpl. Reyes",
    ///     contact_number: "0917 000 0000",
    ///     email: None,
    ///     response_time_hours: 4,
    /// })
    /// .expect("valid agency");
    /// assert_eq!(draft.name(), "PNP Traffic Unit");
    /// ```
    pub fn new(fields: AgencyFields<'_>) -> Result<Self, AgencyValidationError> {
        if !(1..=SLA_MAX_HOURS).contains(&fields.response_time_hours) {
            return Err(AgencyValidationError::InvalidResponseTime { max: SLA_MAX_HOURS });
        }
        Ok(Self {
            name: required("name", fields.name, NAME_MAX)?,
            agency_type: required("agencyType", fields.agency_type, TEXT_MAX)?,
            contact_person: required("contactPerson", fields.contact_person, TEXT_MAX)?,
            contact_number: required("contactNumber", fields.contact_number, TEXT_MAX)?,
            email: optional_email(fields.email)?,
            response_time_hours: fields.response_time_hours,
        })
    }

    /// Trimmed agency name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Materialise the agency record.
    #[must_use]
    pub fn into_agency(self, id: AgencyId, created_at: DateTime<Utc>) -> Agency {
        Agency {
            id,
            name: self.name,
            agency_type: self.agency_type,
            contact_person: self.contact_person,
            contact_number: self.contact_number,
            email: self.email,
            response_time_hours: self.response_time_hours,
            created_at,
        }
    }
}

/// An agency reports can be referred to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agency {
    /// Primary key.
    pub id: AgencyId,
    /// Display name.
    pub name: String,
    /// Classification such as "police" or "traffic office".
    pub agency_type: String,
    /// Person to call.
    pub contact_person: String,
    /// Phone number.
    pub contact_number: String,
    /// Optional e-mail address.
    pub email: Option<String>,
    /// Promised response time in hours.
    pub response_time_hours: u32,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Agency {
    /// Contact line copied onto referred reports.
    #[must_use]
    pub fn contact_line(&self) -> String {
        format!("{} ({})", self.contact_person, self.contact_number)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn fields() -> AgencyFields<'static> {
        AgencyFields {
            name: " City Traffic Office ",
            agency_type: "traffic office",
            contact_person: "Engr. Santos",
            contact_number: "(02) 8123 4567",
            email: Some("traffic@city.gov.ph"),
            response_time_hours: 24,
        }
    }

    #[rstest]
    fn valid_fields_are_trimmed(fields: AgencyFields<'static>) {
        let agency = AgencyDraft::new(fields)
            .expect("valid")
            .into_agency(AgencyId::random(), Utc::now());
        assert_eq!(agency.name, "City Traffic Office");
        assert_eq!(agency.contact_line(), "Engr. Santos ((02) 8123 4567)");
    }

    #[rstest]
    #[case(0)]
    #[case(721)]
    fn response_time_must_be_in_range(fields: AgencyFields<'static>, #[case] hours: u32) {
        let err = AgencyDraft::new(AgencyFields {
            response_time_hours: hours,
            ..fields
        })
        .expect_err("invalid sla");
        assert_eq!(err.field(), "responseTimeHours");
    }

    #[rstest]
    #[case("no-at-sign")]
    #[case("@city.gov.ph")]
    #[case("a@b@c")]
    fn malformed_emails_are_rejected(fields: AgencyFields<'static>, #[case] email: &'static str) {
        let err = AgencyDraft::new(AgencyFields {
            email: Some(email),
            ..fields
        })
        .expect_err("invalid email");
        assert_eq!(err, AgencyValidationError::InvalidEmail);
    }

    #[rstest]
    fn blank_email_is_treated_as_absent(fields: AgencyFields<'static>) {
        let agency = AgencyDraft::new(AgencyFields {
            email: Some("  "),
            ..fields
        })
        .expect("valid")
        .into_agency(AgencyId::random(), Utc::now());
        assert!(agency.email.is_none());
    }

    #[rstest]
    fn blank_contact_person_names_the_field(fields: AgencyFields<'static>) {
        let err = AgencyDraft::new(AgencyFields {
            contact_person: " ",
            ..fields
        })
        .expect_err("blank contact");
        assert_eq!(err.field(), "contactPerson");
    }
}
