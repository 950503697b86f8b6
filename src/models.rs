use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::credentials::CredentialDigest;

// --- Identity Records ---

/// Role
///
/// A named capability. Role names are unique and case-sensitive; records are created
/// lazily on first reference and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// User
///
/// A registered principal. Roles are shared handles into the identity store's role
/// registry, never private copies. Not serializable: the digest must not leave the process.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub credential_digest: CredentialDigest,
    pub roles: Vec<Arc<Role>>,
}

impl User {
    /// Names of every role assigned to this user.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.name.clone()).collect()
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

// --- Catalog Records ---

/// Destination
///
/// A catalog entry. `average_rating * rating_count` is the running sum of every accepted
/// rating; both fields are zero until the first rating lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub description: String,
    pub average_rating: f64,
    #[serde(rename = "numberOfRatings")]
    pub rating_count: u32,
}

// --- Request Payloads ---

/// DestinationRequest
///
/// Body of `POST /api/destinations` and `PUT /api/destinations/{id}`. Rating fields are
/// not part of the payload; anything extra in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DestinationRequest {
    pub name: String,
    pub location: String,
    pub description: String,
}

/// RegisterRequest
///
/// Body of `POST /api/auth/register`. The password is hashed before storage and never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

pub const DEFAULT_ROLE: &str = "USER";
pub const ADMIN_ROLE: &str = "ADMIN";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// --- Response Payloads ---

/// LoginResponse
///
/// Confirms a successful credential check with the resolved role names.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub username: String,
    pub roles: Vec<String>,
}

/// UserProfile
///
/// Outward view of a `User`; the credential digest is intentionally absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            roles: user.role_names(),
        }
    }
}
