use chrono::{DateTime, Utc};

/// The two per-user override lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserList {
    Whitelist,
    Blacklist,
}

impl UserList {
    pub fn table(&self) -> &'static str {
        match self {
            UserList::Whitelist => "whitelist",
            UserList::Blacklist => "blacklist",
        }
    }

    /// The list an entry is removed from when added to this one
    pub fn opposite(&self) -> UserList {
        match self {
            UserList::Whitelist => UserList::Blacklist,
            UserList::Blacklist => UserList::Whitelist,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListEntry {
    pub user_id: i64,
    pub reason: Option<String>,
    pub added_by: i64,
    pub added_at: DateTime<Utc>,
}
