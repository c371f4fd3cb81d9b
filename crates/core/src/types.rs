//! Primitive types shared by every layer: row ids, timestamps, and the
//! account role carried in access tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Primary keys are PostgreSQL `BIGSERIAL`.
pub type DbId = i64;

/// Stored and compared in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Account role. Stored lowercase in `users.role`, which has a matching
/// check constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Admins may verify listings, change roles, and edit any listing.
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown role '{s}'; expected '{}' or '{}'",
                    Role::Admin,
                    Role::User
                ))
            })
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
