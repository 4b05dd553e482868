use serde::{Deserialize, Serialize};

/// Repository permission tier, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Admin,
    Maintain,
    Write,
    Triage,
    Read,
    Unknown,
}

impl Permission {
    pub const TIERS: [Permission; 5] = [
        Permission::Admin,
        Permission::Maintain,
        Permission::Write,
        Permission::Triage,
        Permission::Read,
    ];

    /// Accepts both GraphQL (`WRITE`, `READ`) and REST (`push`, `pull`) spellings.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Permission::Admin,
            "maintain" => Permission::Maintain,
            "write" | "push" => Permission::Write,
            "triage" => Permission::Triage,
            "read" | "pull" => Permission::Read,
            _ => Permission::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Admin => "admin",
            Permission::Maintain => "maintain",
            Permission::Write => "write",
            Permission::Triage => "triage",
            Permission::Read => "read",
            Permission::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The boolean permission object REST endpoints attach to repositories and teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFlags {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub maintain: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub triage: bool,
    #[serde(default)]
    pub pull: bool,
}

impl PermissionFlags {
    /// Highest granted tier; anything below triage counts as read.
    pub fn level(&self) -> Permission {
        if self.admin {
            Permission::Admin
        } else if self.maintain {
            Permission::Maintain
        } else if self.push {
            Permission::Write
        } else if self.triage {
            Permission::Triage
        } else {
            Permission::Read
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectKind {
    User,
    Team,
}

/// Which lookup produced an access entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessSource {
    #[serde(rename = "graphql")]
    GraphQL,
    #[serde(rename = "repo-teams")]
    RepoTeams,
    #[serde(rename = "team-scan")]
    TeamScan,
}

impl AccessSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessSource::GraphQL => "graphql",
            AccessSource::RepoTeams => "repo-teams",
            AccessSource::TeamScan => "team-scan",
        }
    }
}

/// Descriptive fields carried alongside an access grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub display_name: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    /// User login, or `@org/slug` for teams.
    pub subject_id: String,
    pub subject_kind: SubjectKind,
    /// GraphQL typename for users (`User`, `Bot`, `Mannequin`), `Team` otherwise.
    pub subject_type: String,
    pub permission: Permission,
    pub source_repository: String,
    pub source: AccessSource,
    pub profile: SubjectProfile,
}

impl AccessEntry {
    pub fn user(login: impl Into<String>, permission: Permission, repository: impl Into<String>) -> Self {
        Self {
            subject_id: login.into(),
            subject_kind: SubjectKind::User,
            subject_type: "User".to_string(),
            permission,
            source_repository: repository.into(),
            source: AccessSource::GraphQL,
            profile: SubjectProfile::default(),
        }
    }

    pub fn team(
        organization: &str,
        slug: &str,
        permission: Permission,
        repository: impl Into<String>,
        source: AccessSource,
    ) -> Self {
        Self {
            subject_id: team_subject_id(organization, slug),
            subject_kind: SubjectKind::Team,
            subject_type: "Team".to_string(),
            permission,
            source_repository: repository.into(),
            source,
            profile: SubjectProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: SubjectProfile) -> Self {
        self.profile = profile;
        self
    }
}

pub fn team_subject_id(organization: &str, slug: &str) -> String {
    format!("@{}/{}", organization, slug)
}
