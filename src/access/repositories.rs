use serde_json::json;

use crate::config::AuditConfig;
use crate::error::{Error, Result};
use crate::github::queries::{self, OrgRepositoriesData, RepositoryNode};
use crate::github::{GitHubClient, Page, Paginator};
use crate::models::{RepositoryInfo, Visibility};

/// Repositories found in the organization and what was left out.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub repositories: Vec<RepositoryInfo>,
    pub total_count: Option<u64>,
    pub skipped_inaccessible: usize,
    pub skipped_archived: usize,
    pub complete: bool,
}

pub async fn discover_repositories(client: &GitHubClient, config: &AuditConfig) -> Discovery {
    tracing::info!(
        "Fetching repositories for organization: {} (include archived: {})",
        config.organization,
        config.include_archived
    );

    let paginator = Paginator::new("organization repositories", config.repo_page_pause);
    let collected = paginator
        .collect(|cursor| fetch_page(client, config, cursor))
        .await;

    let mut discovery = Discovery {
        total_count: collected.total_count,
        complete: collected.complete,
        ..Default::default()
    };

    for node in collected.items {
        let Some(info) = node.and_then(|n| into_info(n, &config.organization)) else {
            discovery.skipped_inaccessible += 1;
            continue;
        };
        if info.archived && !config.include_archived {
            discovery.skipped_archived += 1;
            continue;
        }
        discovery.repositories.push(info);
    }

    if discovery.skipped_inaccessible > 0 {
        tracing::warn!(
            "Skipped {} repositories due to access restrictions",
            discovery.skipped_inaccessible
        );
    }
    if !discovery.complete {
        tracing::warn!(
            "Repository listing stopped early; continuing with {} repositories",
            discovery.repositories.len()
        );
    }

    discovery
}

async fn fetch_page(
    client: &GitHubClient,
    config: &AuditConfig,
    cursor: Option<String>,
) -> Result<Page<Option<RepositoryNode>>> {
    let data: OrgRepositoriesData = client
        .query(
            queries::ORG_REPOSITORIES,
            json!({
                "org": config.organization,
                "first": config.repo_page_size,
                "after": cursor,
            }),
        )
        .await?;

    let connection = data
        .organization
        .map(|org| org.repositories)
        .ok_or_else(|| Error::GitHubApi("no organization data in response".to_string()))?;

    tracing::info!(
        "Found {} repositories on page (organization total: {})",
        connection.nodes.len(),
        connection.total_count.unwrap_or_default()
    );

    Ok(Page {
        items: connection.nodes,
        page_info: connection.page_info,
        total_count: connection.total_count,
    })
}

/// Nodes without a name are placeholders for repositories the token cannot read.
fn into_info(node: RepositoryNode, organization: &str) -> Option<RepositoryInfo> {
    let name = node.name.filter(|n| !n.is_empty())?;
    let full_name = node
        .name_with_owner
        .unwrap_or_else(|| format!("{}/{}", organization, name));

    Some(RepositoryInfo {
        name,
        full_name,
        visibility: if node.is_private {
            Visibility::Private
        } else {
            Visibility::Public
        },
        archived: node.is_archived,
        fork: node.is_fork,
        disabled: node.is_disabled,
        created_at: node.created_at,
        updated_at: node.updated_at,
    })
}
