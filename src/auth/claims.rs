use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse authorization tier. Stored as the `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,    // user ID
    pub role: Role, // role at issue time
    pub iat: i64,   // issued at (unix timestamp)
    pub exp: i64,   // expires at (unix timestamp)
}

/// Identity of the caller, derived from a verified token. Lives for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    #[serde(rename = "id")]
    pub subject_id: i64,
    pub role: Role,
}

impl From<&Claims> for Principal {
    fn from(c: &Claims) -> Self {
        Self {
            subject_id: c.id,
            role: c.role,
        }
    }
}
