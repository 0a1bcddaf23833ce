use serde::{Deserialize, Serialize};

/// Body of `PUT /users/admin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminGrantRequest {
    pub email: String,
}

/// Response of `GET /users/{email}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}

/// Query string of the per-user listing routes, e.g. `/user/order?userEmail=a@x.com`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerQuery {
    #[serde(rename = "userEmail")]
    pub user_email: String,
}
