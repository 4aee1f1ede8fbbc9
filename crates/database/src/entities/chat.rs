//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A conversation: either a direct 1:1 chat (two members, no name) or a
/// named group with a mutable member/admin set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub public_id: String,
    pub is_direct: bool,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
}

/// Membership of one chat, resolved to usernames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRoster {
    pub members: Vec<String>,
    pub admins: Vec<String>,
}
