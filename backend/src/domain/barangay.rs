//! Barangays, the scoping key for every report query.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::BarangayId;

const NAME_MAX: usize = 120;

/// Validation failures for barangay records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BarangayValidationError {
    /// A required field was blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },
    /// A field exceeded its column width.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
}

/// An administrative area served by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Barangay {
    /// Primary key.
    #[schema(value_type = String, format = "uuid")]
    pub id: BarangayId,
    /// Unique name, for example "Barangay San Isidro".
    pub name: String,
    /// Municipality or city the barangay belongs to.
    pub municipality: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

fn checked(field: &'static str, value: &str) -> Result<String, BarangayValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BarangayValidationError::Empty { field });
    }
    if value.chars().count() > NAME_MAX {
        return Err(BarangayValidationError::TooLong {
            field,
            max: NAME_MAX,
        });
    }
    Ok(value.to_owned())
}

impl Barangay {
    /// Validate and build a barangay record.
    pub fn new(
        id: BarangayId,
        name: &str,
        municipality: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, BarangayValidationError> {
        Ok(Self {
            id,
            name: checked("name", name)?,
            municipality: checked("municipality", municipality)?,
            created_at,
        })
    }
}
