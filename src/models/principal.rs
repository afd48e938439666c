use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Merchant,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role_str = match self {
            Role::User => "USER",
            Role::Merchant => "MERCHANT",
            Role::Admin => "ADMIN",
        };
        write!(f, "{role_str}")
    }
}

/// Authenticated caller, as asserted by the auth collaborator's token.
///
/// Inserted into request extensions by
/// [`auth_middleware`](crate::middleware::auth_middleware).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}
