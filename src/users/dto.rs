use serde::{Deserialize, Serialize};

use crate::{
    auth::claims::{Principal, Role},
    users::repo_types::User,
};

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            phone: u.phone,
            address: u.address,
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub message: String,
    pub user: Principal,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleChangeRequest {
    pub role: String,
}
