//! Portal users, roles and the authenticated actor.
//!
//! Authorisation decisions live in the domain services. They operate on an
//! [`Actor`], the session user re-read from the account store for each
//! request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BarangayId, Error, UserId};

/// Role attached to every portal account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Barangay administrator with full access, including archiving.
    Admin,
    /// Barangay employee who reviews, assigns and refers reports.
    Employee,
    /// Community patrol volunteer who works on assigned reports.
    Tanod,
    /// Resident who files reports.
    Resident,
}

impl UserRole {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Employee => "EMPLOYEE",
            Self::Tanod => "TANOD",
            Self::Resident => "RESIDENT",
        }
    }

    /// Admin and Employee accounts count as barangay staff.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Employee)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown user role: {0}")]
pub struct ParseUserRoleError(pub String);

impl FromStr for UserRole {
    type Err = ParseUserRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "EMPLOYEE" => Ok(Self::Employee),
            "TANOD" => Ok(Self::Tanod),
            "RESIDENT" => Ok(Self::Resident),
            _ => Err(ParseUserRoleError(s.to_owned())),
        }
    }
}

/// The authenticated user performing an operation.
///
/// # Examples
/// ```
/// use transport_portal::domain::{Actor, BarangayId, UserId, UserRole};
///
/// let actor = Actor::new(UserId::random(), UserRole::Employee, BarangayId::random());
/// assert!(actor.is_staff());
/// assert!(actor.require_admin().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    #[schema(value_type = String, format = "uuid")]
    user_id: UserId,
    role: UserRole,
    #[schema(value_type = String, format = "uuid")]
    barangay_id: BarangayId,
    verified: bool,
}

impl Actor {
    /// Build a verified actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole, barangay_id: BarangayId) -> Self {
        Self {
            user_id,
            role,
            barangay_id,
            verified: true,
        }
    }

    /// Override the verification flag.
    #[must_use]
    pub const fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Account identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Account role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Barangay every query of this actor is scoped to.
    #[must_use]
    pub const fn barangay_id(&self) -> BarangayId {
        self.barangay_id
    }

    /// Whether the account has been verified by barangay staff.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// Shorthand for [`UserRole::is_staff`].
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Fail with `403` unless the actor is barangay staff.
    pub fn require_staff(&self) -> Result<(), Error> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(Error::forbidden("barangay staff role required"))
        }
    }

    /// Fail with `403` unless the actor is an administrator.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }
}

/// Stored account used for credential checks and actor resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Account identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Name shown to staff.
    pub display_name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// Verification flag set by staff.
    pub is_verified: bool,
    /// Home barangay.
    pub barangay_id: BarangayId,
}

impl UserAccount {
    /// Project the account onto the actor used for authorisation.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.id, self.role, self.barangay_id).with_verified(self.is_verified)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("ADMIN", UserRole::Admin)]
    #[case("employee", UserRole::Employee)]
    #[case(" Tanod ", UserRole::Tanod)]
    #[case("RESIDENT", UserRole::Resident)]
    fn roles_parse_case_insensitively(#[case] raw: &str, #[case] expected: UserRole) {
        assert_eq!(raw.parse::<UserRole>().expect("known role"), expected);
    }

    #[rstest]
    fn unknown_roles_are_rejected() {
        let err = "MAYOR".parse::<UserRole>().expect_err("unknown role");
        assert_eq!(err.to_string(), "unknown user role: MAYOR");
    }

    #[rstest]
    #[case(UserRole::Admin, true, true)]
    #[case(UserRole::Employee, true, false)]
    #[case(UserRole::Tanod, false, false)]
    #[case(UserRole::Resident, false, false)]
    fn role_gates(#[case] role: UserRole, #[case] staff: bool, #[case] admin: bool) {
        let actor = Actor::new(UserId::random(), role, BarangayId::random());
        assert_eq!(actor.require_staff().is_ok(), staff);
        assert_eq!(actor.require_admin().is_ok(), admin);
        if let Err(err) = actor.require_admin() {
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }

    #[rstest]
    fn account_projects_verification_onto_actor() {
        let account = UserAccount {
            id: UserId::random(),
            username: "juan".to_owned(),
            display_name: "Juan Dela Cruz".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: UserRole::Resident,
            is_verified: false,
            barangay_id: BarangayId::random(),
        };
        let actor = account.actor();
        assert!(!actor.is_verified());
        assert_eq!(actor.user_id(), account.id);
        assert_eq!(actor.barangay_id(), account.barangay_id);
    }
}
