use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Duration;

use crate::access::resolver::{AccessResolver, Resolution};
use crate::config::AuditConfig;
use crate::error::{Error, Result};
use crate::github::queries::{self, CollaboratorEdge, CollaboratorNode, RepoCollaboratorsData};
use crate::github::{GitHubClient, Page, Paginator};
use crate::models::{AccessEntry, AccessSource, Permission, RepositoryInfo, SubjectKind, SubjectProfile};

/// Direct (non-inherited) user collaborators of a repository.
pub struct CollaboratorResolver {
    client: Arc<GitHubClient>,
    organization: String,
    page_size: u32,
    pause: Duration,
}

impl CollaboratorResolver {
    pub fn new(client: Arc<GitHubClient>, config: &AuditConfig) -> Self {
        Self {
            client,
            organization: config.organization.clone(),
            page_size: config.collaborator_page_size,
            pause: config.sub_page_pause,
        }
    }

    async fn fetch_page(&self, repository: &RepositoryInfo, cursor: Option<String>) -> Result<Page<AccessEntry>> {
        let data: RepoCollaboratorsData = self
            .client
            .query(
                queries::REPO_COLLABORATORS,
                json!({
                    "owner": repository.owner(&self.organization),
                    "name": repository.name,
                    "first": self.page_size,
                    "after": cursor,
                }),
            )
            .await?;

        let connection = data
            .repository
            .ok_or_else(|| Error::GitHubApi(format!("repository {} not returned", repository.full_name)))?
            .collaborators
            .ok_or_else(|| Error::AccessDenied(format!("collaborators of {} are not visible", repository.full_name)))?;

        Ok(Page {
            items: join_collaborators(connection.nodes, connection.edges, &repository.full_name),
            page_info: connection.page_info,
            total_count: connection.total_count,
        })
    }
}

#[async_trait]
impl AccessResolver for CollaboratorResolver {
    async fn resolve(&self, repository: &RepositoryInfo) -> Resolution {
        let paginator = Paginator::new(format!("collaborators of {}", repository.name), self.pause);
        let collected = paginator
            .collect(|cursor| self.fetch_page(repository, cursor))
            .await;

        let found = collected.items.len();
        match collected.total_count {
            Some(expected) if expected as usize != found => tracing::warn!(
                "{}: retrieved {}/{} collaborators",
                repository.name,
                found,
                expected
            ),
            _ if collected.pages > 1 => tracing::info!(
                "{}: retrieved all {} collaborators ({} pages)",
                repository.name,
                found,
                collected.pages
            ),
            _ => {}
        }

        Resolution {
            entries: collected.items,
            complete: collected.complete,
        }
    }

    fn name(&self) -> &str {
        "collaborators"
    }
}

/// Joins collaborator nodes with the edges carrying their permission, keyed
/// by login. A node with no matching edge is kept with `Permission::Unknown`.
pub fn join_collaborators(
    nodes: Vec<Option<CollaboratorNode>>,
    edges: Vec<Option<CollaboratorEdge>>,
    repository: &str,
) -> Vec<AccessEntry> {
    let permissions: HashMap<String, Permission> = edges
        .into_iter()
        .flatten()
        .filter_map(|edge| {
            let login = edge.node?.login?;
            let permission = edge
                .permission
                .as_deref()
                .map(Permission::parse)
                .unwrap_or(Permission::Unknown);
            Some((login, permission))
        })
        .collect();

    nodes
        .into_iter()
        .flatten()
        .filter_map(|node| {
            let login = node.login.filter(|l| !l.is_empty())?;
            let permission = permissions.get(&login).copied().unwrap_or(Permission::Unknown);
            Some(AccessEntry {
                subject_kind: SubjectKind::User,
                subject_type: node.typename.unwrap_or_else(|| "User".to_string()),
                permission,
                source_repository: repository.to_string(),
                source: AccessSource::GraphQL,
                profile: SubjectProfile {
                    display_name: node.name.unwrap_or_default(),
                    company: node.company.unwrap_or_default(),
                    location: node.location.unwrap_or_default(),
                    url: node.url.unwrap_or_default(),
                    node_id: node.id.unwrap_or_default(),
                },
                subject_id: login,
            })
        })
        .collect()
}
