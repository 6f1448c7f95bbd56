use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::GroupId;

/// Name of the built-in group that can never be deleted.
pub const PROTECTED_GROUP_NAME: &str = "기본그룹";

/// A named collection of proxies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub proxy_count: u32,
    /// Name of the group's main proxy, if one is designated.
    pub main_server: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn is_protected(&self) -> bool {
        self.name == PROTECTED_GROUP_NAME
    }
}
