use serde::Serialize;

/// One access grant joined with its repository's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionRow {
    pub username: String,
    pub user_name: String,
    pub user_type: String,
    pub user_company: String,
    pub user_location: String,
    pub repo_name: String,
    pub repo_full_name: String,
    pub permission: String,
    pub is_private_repo: bool,
    pub is_archived_repo: bool,
    pub is_fork_repo: bool,
    pub is_disabled_repo: bool,
    pub repo_updated_at: String,
    pub repo_created_at: String,
    pub data_source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubjectSummaryRow {
    pub username: String,
    pub user_name: String,
    pub user_type: String,
    pub user_company: String,
    pub user_location: String,
    pub total_repos: u32,
    pub admin_repos: u32,
    pub maintain_repos: u32,
    pub write_repos: u32,
    pub triage_repos: u32,
    pub read_repos: u32,
    pub private_repos: u32,
    pub public_repos: u32,
    pub archived_repos: u32,
    pub fork_repos: u32,
    pub original_repos: u32,
    pub disabled_repos: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositorySummaryRow {
    pub repo_name: String,
    pub repo_full_name: String,
    pub is_private: bool,
    pub is_archived: bool,
    pub is_fork: bool,
    pub is_disabled: bool,
    pub total_collaborators: u32,
    pub admin_users: u32,
    pub maintain_users: u32,
    pub write_users: u32,
    pub triage_users: u32,
    pub read_users: u32,
    pub access_complete: bool,
    pub updated_at: String,
    pub created_at: String,
}

/// The three projections written for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessReport {
    pub permissions: Vec<PermissionRow>,
    pub subjects: Vec<SubjectSummaryRow>,
    pub repositories: Vec<RepositorySummaryRow>,
}
