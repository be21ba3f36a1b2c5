//! Authentication primitives: credentials and signup payloads.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserName, UserValidationError};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email failed address validation.
    Email(UserValidationError),
    /// Name failed validation (signup only).
    Name(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than the minimum (new passwords only).
    PasswordTooShort { min: usize },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) | Self::Name(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Minimum length for newly chosen passwords.
pub const PASSWORD_MIN: usize = 8;

/// A password kept in zeroed-on-drop memory.
///
/// Login accepts any non-empty password (the stored hash decides); new
/// passwords additionally enforce [`PASSWORD_MIN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept an existing password for verification.
    pub fn for_login(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a newly chosen password, enforcing the minimum length.
    pub fn new_choice(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        if raw.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// The raw password, for hashing or verification only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialValidationError::Email)?;
        let password = Password::for_login(password)?;
        Ok(Self { email, password })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password to verify against the stored hash.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated signup payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    name: UserName,
    email: EmailAddress,
    password: Password,
}

impl SignupDetails {
    /// Construct signup details from raw inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let name = UserName::new(name).map_err(CredentialValidationError::Name)?;
        let email = EmailAddress::new(email).map_err(CredentialValidationError::Email)?;
        let password = Password::new_choice(password)?;
        Ok(Self {
            name,
            email,
            password,
        })
    }

    /// Chosen display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Contact address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Chosen password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn login_accepts_short_passwords() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "pw").expect("valid creds");
        assert_eq!(creds.email().as_ref(), "ada@example.com");
        assert_eq!(creds.password().expose(), "pw");
    }

    #[rstest]
    fn login_rejects_empty_password() {
        let err = LoginCredentials::try_from_parts("ada@example.com", "")
            .expect_err("empty password must fail");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[rstest]
    fn signup_enforces_minimum_password_length() {
        let err = SignupDetails::try_from_parts("Ada", "ada@example.com", "short")
            .expect_err("short password must fail");
        assert_eq!(
            err,
            CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN }
        );
    }

    #[rstest]
    fn signup_validates_name_and_email() {
        assert!(matches!(
            SignupDetails::try_from_parts("", "ada@example.com", "long enough"),
            Err(CredentialValidationError::Name(_))
        ));
        assert!(matches!(
            SignupDetails::try_from_parts("Ada", "nope", "long enough"),
            Err(CredentialValidationError::Email(_))
        ));
    }
}
