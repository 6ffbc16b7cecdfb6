//! Allow/deny decisions over an already-resolved principal and resource owner.

use thiserror::Error;
use tracing::warn;

use super::claims::{Principal, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("forbidden")]
pub struct Forbidden;

/// Exact role match.
pub fn require_role(principal: &Principal, required: Role) -> Result<(), Forbidden> {
    if principal.role == required {
        return Ok(());
    }
    warn!(user_id = principal.subject_id, role = %principal.role, required = %required, "role check failed");
    Err(Forbidden)
}

/// Owner of the resource, or anyone holding `role`.
pub fn require_owner_or_role(
    principal: &Principal,
    owner_id: i64,
    role: Role,
) -> Result<(), Forbidden> {
    if principal.subject_id == owner_id || principal.role == role {
        return Ok(());
    }
    warn!(user_id = principal.subject_id, owner_id, "ownership check failed");
    Err(Forbidden)
}

/// Owner only, no role override.
pub fn require_owner(principal: &Principal, owner_id: i64) -> Result<(), Forbidden> {
    if principal.subject_id == owner_id {
        return Ok(());
    }
    warn!(user_id = principal.subject_id, owner_id, "owner-only check failed");
    Err(Forbidden)
}
