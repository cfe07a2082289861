//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies and query strings carry identifiers, enum values and
//! timestamps as strings. These helpers parse them into domain types and
//! produce `invalid_request` errors whose details name the offending field.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    ValidationError::new(field, format!("missing required field: {}", field.as_str()))
        .with_code(ErrorCode::MissingField)
}

/// Unwrap a required body field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Attach the field name to a domain validation message.
pub(crate) fn field_error(field: FieldName, message: impl Into<String>) -> Error {
    ValidationError::new(field, message).with_code(ErrorCode::InvalidValue)
}

/// Parse a UUID into any identifier type built from one.
pub(crate) fn parse_id<T: From<Uuid>>(value: &str, field: FieldName) -> Result<T, Error> {
    Uuid::parse_str(value.trim()).map(T::from).map_err(|_| {
        ValidationError::new(field, format!("{} must be a valid UUID", field.as_str()))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn parse_optional_id<T: From<Uuid>>(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_id(&raw, field)).transpose()
}

/// Parse a storage-named enum such as a status or category.
pub(crate) fn parse_enum<T: FromStr>(
    value: &str,
    field: FieldName,
    expected: &'static str,
) -> Result<T, Error> {
    value.trim().parse::<T>().map_err(|_| {
        ValidationError::new(
            field,
            format!("{} must be one of {expected}", field.as_str()),
        )
        .with_value(ErrorCode::InvalidValue, value)
    })
}

pub(crate) fn parse_optional_enum<T: FromStr>(
    value: Option<String>,
    field: FieldName,
    expected: &'static str,
) -> Result<Option<T>, Error> {
    value
        .map(|raw| parse_enum(&raw, field, expected))
        .transpose()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            ValidationError::new(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
            )
            .with_value(ErrorCode::InvalidTimestamp, value)
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(&raw, field))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode as DomainCode, ReportId, ReportStatus};
    use rstest::rstest;

    fn details_code(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|details| details.get("code"))
            .and_then(serde_json::Value::as_str)
    }

    #[rstest]
    fn missing_fields_name_the_field() {
        let err = require::<String>(None, FieldName::new("location")).expect_err("missing");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        assert_eq!(err.message(), "missing required field: location");
        assert_eq!(details_code(&err), Some("missing_field"));
    }

    #[rstest]
    fn identifiers_parse_into_typed_ids() {
        let id: ReportId = parse_id(
            " 3fa85f64-5717-4562-b3fc-2c963f66afa6 ",
            FieldName::new("id"),
        )
        .expect("valid uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");

        let err = parse_id::<ReportId>("RPT-1", FieldName::new("id")).expect_err("invalid");
        assert_eq!(details_code(&err), Some("invalid_uuid"));
    }

    #[rstest]
    #[case("in_progress", Some(ReportStatus::InProgress))]
    #[case("finished", None)]
    fn enums_parse_by_storage_name(#[case] raw: &str, #[case] expected: Option<ReportStatus>) {
        let parsed =
            parse_enum::<ReportStatus>(raw, FieldName::new("status"), "a report status").ok();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn timestamps_must_be_rfc3339() {
        let err = parse_optional_rfc3339_timestamp(
            Some("2026-13-01".to_owned()),
            FieldName::new("from"),
        )
        .expect_err("invalid");
        assert_eq!(details_code(&err), Some("invalid_timestamp"));
        assert!(
            parse_optional_rfc3339_timestamp(None, FieldName::new("from"))
                .expect("absent")
                .is_none()
        );
    }
}
