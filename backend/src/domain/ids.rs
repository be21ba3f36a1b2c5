//! Entity identifier newtypes.
//!
//! Every aggregate is keyed by a UUID wrapped in its own type so that a post
//! id can never be passed where a user id is expected. The wrappers share
//! serde and parsing behaviour through [`define_entity_id!`].

use std::fmt;

use uuid::Uuid;

/// Validation errors returned when parsing an entity identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// The identifier was empty.
    Empty,
    /// The identifier was not a valid UUID.
    Invalid,
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier must not be empty"),
            Self::Invalid => write!(f, "identifier must be a valid UUID"),
        }
    }
}

impl std::error::Error for IdValidationError {}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Validate and construct an identifier from string input.
            pub fn new(value: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let raw = value.as_ref();
                if raw.is_empty() {
                    return Err(IdValidationError::Empty);
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdValidationError::Invalid)
            }

            /// Wrap an already-parsed UUID.
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_entity_id! {
    /// Stable user account identifier.
    UserId
}

define_entity_id! {
    /// Stable post identifier.
    PostId
}

define_entity_id! {
    /// Stable comment identifier.
    CommentId
}

define_entity_id! {
    /// Stable vote edge identifier.
    VoteId
}
