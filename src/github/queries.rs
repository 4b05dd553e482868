//! GraphQL documents and the wire types they deserialize into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::PermissionFlags;

pub const VIEWER: &str = r#"
query {
  viewer { login id }
  rateLimit { limit remaining resetAt used }
}
"#;

pub const RATE_LIMIT: &str = r#"
query {
  rateLimit { limit remaining resetAt used }
}
"#;

pub const ORGANIZATION_ACCESS: &str = r#"
query($org: String!) {
  organization(login: $org) {
    login
    viewerCanAdminister
    viewerIsAMember
  }
  viewer {
    login
    organizations(first: 100) { nodes { login } }
  }
}
"#;

pub const ORG_REPOSITORIES: &str = r#"
query($org: String!, $first: Int!, $after: String) {
  organization(login: $org) {
    repositories(first: $first, after: $after, orderBy: {field: UPDATED_AT, direction: DESC}) {
      totalCount
      pageInfo { hasNextPage endCursor }
      nodes {
        name
        nameWithOwner
        isPrivate
        isArchived
        isFork
        isDisabled
        updatedAt
        createdAt
      }
    }
  }
}
"#;

pub const REPO_COLLABORATORS: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    collaborators(first: $first, after: $after, affiliation: DIRECT) {
      totalCount
      pageInfo { hasNextPage endCursor }
      nodes {
        __typename
        login
        name
        url
        ... on User { id company location }
      }
      edges {
        permission
        node { login }
      }
    }
  }
}
"#;

pub const ORG_TEAMS: &str = r#"
query($org: String!, $first: Int!, $after: String) {
  organization(login: $org) {
    teams(first: $first, after: $after) {
      totalCount
      pageInfo { hasNextPage endCursor }
      nodes { id name slug description privacy url }
    }
  }
}
"#;

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize)]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    pub variables: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "nullable")]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    pub fn is_forbidden(&self) -> bool {
        self.error_type.as_deref() == Some("FORBIDDEN")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "N: Deserialize<'de>"))]
pub struct Connection<N> {
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub page_info: PageInfo,
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: Vec<Option<N>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub limit: Option<u32>,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub used: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitData {
    pub rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    pub login: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerData {
    pub viewer: Option<Viewer>,
    pub rate_limit: Option<RateLimitInfo>,
}

#[derive(Debug, Deserialize)]
pub struct LoginNode {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewerOrganizations {
    pub login: String,
    pub organizations: Option<Connection<LoginNode>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationAccess {
    pub login: String,
    #[serde(default)]
    pub viewer_can_administer: bool,
    #[serde(default)]
    pub viewer_is_a_member: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrganizationAccessData {
    pub organization: Option<OrganizationAccess>,
    pub viewer: Option<ViewerOrganizations>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: Option<String>,
    pub name_with_owner: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub is_disabled: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct OrgRepositories {
    pub repositories: Connection<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
pub struct OrgRepositoriesData {
    pub organization: Option<OrgRepositories>,
}

#[derive(Debug, Deserialize)]
pub struct CollaboratorNode {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub id: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeNode {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CollaboratorEdge {
    pub permission: Option<String>,
    pub node: Option<EdgeNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorConnection {
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "nullable")]
    pub page_info: PageInfo,
    #[serde(default, deserialize_with = "nullable")]
    pub nodes: Vec<Option<CollaboratorNode>>,
    #[serde(default, deserialize_with = "nullable")]
    pub edges: Vec<Option<CollaboratorEdge>>,
}

#[derive(Debug, Deserialize)]
pub struct RepoCollaborators {
    pub collaborators: Option<CollaboratorConnection>,
}

#[derive(Debug, Deserialize)]
pub struct RepoCollaboratorsData {
    pub repository: Option<RepoCollaborators>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamNode {
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrgTeams {
    pub teams: Connection<TeamNode>,
}

#[derive(Debug, Deserialize)]
pub struct OrgTeamsData {
    pub organization: Option<OrgTeams>,
}

/// Team as listed by `GET /repos/{owner}/{repo}/teams`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub slug: String,
    pub html_url: Option<String>,
    pub permission: Option<String>,
    pub permissions: Option<PermissionFlags>,
}

/// Repository as returned by `GET /orgs/{org}/teams/{slug}/repos/{owner}/{repo}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestTeamRepository {
    pub full_name: String,
    pub permissions: Option<PermissionFlags>,
}
