//! User accounts and their validated value types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::follow::FollowStats;
use super::ids::UserId;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Name was blank after trimming.
    EmptyName,
    /// Name exceeded the allowed length.
    NameTooLong { max: usize },
    /// Name contained characters outside the allowed set.
    NameInvalidCharacters,
    /// Email was blank.
    EmptyEmail,
    /// Email did not look like an address.
    InvalidEmail,
    /// Unknown role label.
    UnknownRole { value: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::NameInvalidCharacters => write!(
                f,
                "name may only contain letters, numbers, spaces, or underscores"
            ),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::UnknownRole { value } => write!(f, "unknown role: {value}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 40;

/// Human readable account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`], trimming surrounding whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let trimmed = name.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '_')
        {
            return Err(UserValidationError::NameInvalidCharacters);
        }
        Ok(Self(trimmed))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lowercased email address.
///
/// ## Invariants
/// - Exactly one `@`, with non-empty local and domain parts.
/// - No whitespace; stored lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = email.into().trim().to_lowercase();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let mut parts = raw.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.') => {
                Ok(Self(raw))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role controlling moderation privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// Can moderate content but not accounts.
    Moderator,
    /// Full administrative access; bypasses ownership checks.
    Admin,
}

impl Role {
    /// Stable label used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Parse a storage label back into a role.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Application user as exposed to clients.
///
/// ## Invariants
/// - `follow_stats` is a cache written only by the follow recompute step.
/// - Credential material never lives on this type; see [`UserAccount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Display name.
    #[schema(value_type = String, example = "Ada Lovelace")]
    pub name: UserName,
    /// Contact address, lowercased.
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: EmailAddress,
    /// Moderation role.
    pub role: Role,
    /// Set when the account is banned; carries the reason shown to the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_reason: Option<String>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Derived follow counts.
    pub follow_stats: FollowStats,
}

impl User {
    /// True when the account is banned.
    pub fn is_banned(&self) -> bool {
        self.ban_reason.is_some()
    }
}

/// Hashed password-reset token with its expiry window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTokenRecord {
    /// SHA-256 hash of the token mailed to the user.
    pub token_hash: String,
    /// Instant after which the token is useless.
    pub expires_at: DateTime<Utc>,
}

impl ResetTokenRecord {
    /// Whether the token has passed its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Full account record as the user store sees it.
///
/// Carries the credential material that must never be serialised to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    /// Client-visible profile.
    pub user: User,
    /// Hashed login password.
    pub password_hash: String,
    /// Pending password-reset token, if any.
    pub reset_token: Option<ResetTokenRecord>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyName)]
    #[case("   ", UserValidationError::EmptyName)]
    #[case("bad!name", UserValidationError::NameInvalidCharacters)]
    fn invalid_names_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = UserName::new(raw).expect_err("invalid name must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn overlong_name_is_rejected() {
        let raw = "a".repeat(USER_NAME_MAX + 1);
        let err = UserName::new(raw).expect_err("overlong name must fail");
        assert_eq!(err, UserValidationError::NameTooLong { max: USER_NAME_MAX });
    }

    #[rstest]
    fn names_are_trimmed() {
        let name = UserName::new("  Ada Lovelace  ").expect("valid name");
        assert_eq!(name.as_ref(), "Ada Lovelace");
    }

    #[rstest]
    #[case("ada@example.com")]
    #[case("ADA@Example.COM")]
    fn emails_are_lowercased(#[case] raw: &str) {
        let email = EmailAddress::new(raw).expect("valid email");
        assert_eq!(email.as_ref(), "ada@example.com");
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("two@@example.com", UserValidationError::InvalidEmail)]
    #[case("@example.com", UserValidationError::InvalidEmail)]
    #[case("ada@nodot", UserValidationError::InvalidEmail)]
    fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = EmailAddress::new(raw).expect_err("invalid email must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case(Role::User, "user")]
    #[case(Role::Moderator, "moderator")]
    #[case(Role::Admin, "admin")]
    fn role_labels_round_trip(#[case] role: Role, #[case] label: &str) {
        assert_eq!(role.as_str(), label);
        assert_eq!(Role::parse(label).expect("known role"), role);
    }

    #[rstest]
    fn reset_token_expiry_is_inclusive() {
        let now = Utc::now();
        let record = ResetTokenRecord {
            token_hash: "abc".to_owned(),
            expires_at: now,
        };
        assert!(record.is_expired(now));
        assert!(!record.is_expired(now - chrono::Duration::seconds(1)));
    }
}
