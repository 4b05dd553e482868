use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::AccessEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

/// Identity and flags of a discovered repository, before access is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub full_name: String,
    pub visibility: Visibility,
    pub archived: bool,
    pub fork: bool,
    pub disabled: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepositoryInfo {
    /// Owner half of `owner/name`, falling back to `default_owner`.
    pub fn owner<'a>(&'a self, default_owner: &'a str) -> &'a str {
        self.full_name
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(default_owner)
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub info: RepositoryInfo,
    pub access: Vec<AccessEntry>,
    /// False when any resolver failed or stopped early for this repository.
    pub access_complete: bool,
}

impl RepositorySnapshot {
    pub fn new(info: RepositoryInfo, access: Vec<AccessEntry>, access_complete: bool) -> Self {
        Self {
            info,
            access,
            access_complete,
        }
    }
}
