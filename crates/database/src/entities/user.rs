//! User entity definitions

use serde::{Deserialize, Serialize};

/// A registered user. The username doubles as the realtime routing key;
/// its uniqueness is enforced by the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub public_id: String,
    pub username: String,
    pub disabled: bool,
    pub created_at: String,
}
