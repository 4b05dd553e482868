use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::{OnceCell, Semaphore};
use tokio::time::Duration;

use crate::access::resolver::{AccessResolver, Resolution};
use crate::config::AuditConfig;
use crate::error::{Error, Result};
use crate::github::queries::{self, OrgTeamsData, PageInfo, RestTeam, RestTeamRepository, TeamNode};
use crate::github::{GitHubClient, Page, Paginator, RestOutcome};
use crate::models::{AccessEntry, AccessSource, Permission, RepositoryInfo, SubjectProfile};

const REPOSITORY_MEDIA_TYPE: &str = "application/vnd.github.v3.repository+json";

/// Organization teams checked by the team scan.
#[derive(Debug, Clone, Default)]
struct Roster {
    teams: Vec<TeamNode>,
    complete: bool,
}

/// Finds the teams granted access to a repository.
///
/// The repository's own team listing is asked first. When that is hidden or
/// breaks, every team in the organization is checked against the repository.
pub struct TeamAccessResolver {
    client: Arc<GitHubClient>,
    organization: String,
    page_size: u32,
    pause: Duration,
    concurrency: usize,
    roster: OnceCell<Roster>,
}

impl TeamAccessResolver {
    pub fn new(client: Arc<GitHubClient>, config: &AuditConfig) -> Self {
        Self {
            client,
            organization: config.organization.clone(),
            page_size: config.team_page_size,
            pause: config.sub_page_pause,
            concurrency: config.team_concurrency.max(1),
            roster: OnceCell::new(),
        }
    }

    /// `GET /repos/{owner}/{repo}/teams`. `None` when the walk did not finish.
    async fn repository_teams(&self, repository: &RepositoryInfo) -> Option<Vec<AccessEntry>> {
        let paginator = Paginator::new(format!("teams of {}", repository.name), self.pause);
        let collected = paginator
            .collect(|cursor| self.fetch_repository_teams(repository, cursor))
            .await;

        if !collected.complete {
            return None;
        }

        Some(
            collected
                .items
                .into_iter()
                .map(|team| {
                    let permission = team
                        .permissions
                        .map(|flags| flags.level())
                        .or_else(|| team.permission.as_deref().map(Permission::parse))
                        .unwrap_or(Permission::Unknown);
                    AccessEntry::team(
                        &self.organization,
                        &team.slug,
                        permission,
                        repository.full_name.as_str(),
                        AccessSource::RepoTeams,
                    )
                    .with_profile(SubjectProfile {
                        display_name: team.name.unwrap_or_default(),
                        url: team.html_url.unwrap_or_default(),
                        node_id: team.id.map(|id| id.to_string()).unwrap_or_default(),
                        ..Default::default()
                    })
                })
                .collect(),
        )
    }

    async fn fetch_repository_teams(
        &self,
        repository: &RepositoryInfo,
        cursor: Option<String>,
    ) -> Result<Page<RestTeam>> {
        let page: u32 = cursor.as_deref().and_then(|c| c.parse().ok()).unwrap_or(1);
        let path = format!(
            "/repos/{}/teams?per_page={}&page={}",
            repository.full_name, self.page_size, page
        );

        match self.client.rest_get(&path, None).await? {
            RestOutcome::Found { body, has_next } => {
                let teams: Vec<RestTeam> = serde_json::from_value(body)?;
                Ok(Page {
                    items: teams,
                    page_info: PageInfo {
                        has_next_page: has_next,
                        end_cursor: has_next.then(|| (page + 1).to_string()),
                    },
                    total_count: None,
                })
            }
            RestOutcome::Forbidden => Err(Error::AccessDenied(format!(
                "team listing for {} is forbidden",
                repository.full_name
            ))),
            RestOutcome::NotFound => Err(Error::AccessDenied(format!(
                "team listing for {} is not available",
                repository.full_name
            ))),
        }
    }

    /// The organization's teams. Only a complete walk is kept for the rest
    /// of the run; a partial one is used once and fetched again next time.
    async fn roster(&self) -> Cow<'_, Roster> {
        let loaded = self
            .roster
            .get_or_try_init(|| async {
                let roster = self.load_roster().await;
                if roster.complete {
                    Ok(roster)
                } else {
                    Err(roster)
                }
            })
            .await;

        match loaded {
            Ok(roster) => Cow::Borrowed(roster),
            Err(partial) => Cow::Owned(partial),
        }
    }

    async fn load_roster(&self) -> Roster {
        let paginator = Paginator::new(format!("teams of {}", self.organization), self.pause);
        let collected = paginator.collect(|cursor| self.fetch_roster_page(cursor)).await;
        let teams: Vec<TeamNode> = collected
            .items
            .into_iter()
            .flatten()
            .filter(|t| t.slug.as_deref().is_some_and(|s| !s.is_empty()))
            .collect();
        tracing::info!(
            "Loaded {} teams for {}{}",
            teams.len(),
            self.organization,
            if collected.complete { "" } else { " (incomplete)" }
        );
        Roster {
            teams,
            complete: collected.complete,
        }
    }

    async fn fetch_roster_page(&self, cursor: Option<String>) -> Result<Page<Option<TeamNode>>> {
        let data: OrgTeamsData = self
            .client
            .query(
                queries::ORG_TEAMS,
                json!({
                    "org": self.organization,
                    "first": self.page_size,
                    "after": cursor,
                }),
            )
            .await?;

        let connection = data
            .organization
            .map(|org| org.teams)
            .ok_or_else(|| Error::AccessDenied(format!("teams of {} are not visible", self.organization)))?;

        Ok(Page {
            items: connection.nodes,
            page_info: connection.page_info,
            total_count: connection.total_count,
        })
    }

    /// Checks every roster team against the repository, at most
    /// `concurrency` checks in flight.
    async fn scan_teams(&self, repository: &RepositoryInfo) -> Resolution {
        let roster = self.roster().await;
        if roster.teams.is_empty() {
            return Resolution {
                entries: Vec::new(),
                complete: roster.complete,
            };
        }

        tracing::debug!(
            "Scanning {} teams for access to {}",
            roster.teams.len(),
            repository.full_name
        );

        let semaphore = Semaphore::new(self.concurrency);
        let checks = roster.teams.iter().map(|team| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                let slug = team.slug.as_deref().unwrap_or_default();
                match self.check_team(slug, repository).await {
                    Ok(permission) => Some(permission.map(|p| (team, p))),
                    Err(e) => {
                        tracing::warn!("Team {} check for {} failed: {}", slug, repository.name, e);
                        None
                    }
                }
            }
        });
        let results = join_all(checks).await;

        let complete = roster.complete && results.iter().all(Option::is_some);
        let entries = results
            .into_iter()
            .flatten()
            .flatten()
            .map(|(team, permission)| {
                AccessEntry::team(
                    &self.organization,
                    team.slug.as_deref().unwrap_or_default(),
                    permission,
                    repository.full_name.as_str(),
                    AccessSource::TeamScan,
                )
                .with_profile(SubjectProfile {
                    display_name: team.name.clone().unwrap_or_default(),
                    url: team.url.clone().unwrap_or_default(),
                    node_id: team.id.clone().unwrap_or_default(),
                    ..Default::default()
                })
            })
            .collect();

        Resolution { entries, complete }
    }

    /// `Some(level)` when the team can reach exactly this repository.
    async fn check_team(&self, slug: &str, repository: &RepositoryInfo) -> Result<Option<Permission>> {
        let path = format!(
            "/orgs/{}/teams/{}/repos/{}",
            self.organization, slug, repository.full_name
        );

        match self.client.rest_get(&path, Some(REPOSITORY_MEDIA_TYPE)).await? {
            RestOutcome::Found { body, .. } => {
                let found: RestTeamRepository = serde_json::from_value(body)?;
                if found.full_name != repository.full_name {
                    return Ok(None);
                }
                Ok(Some(found.permissions.map(|f| f.level()).unwrap_or(Permission::Read)))
            }
            RestOutcome::NotFound => Ok(None),
            RestOutcome::Forbidden => {
                tracing::debug!("Team {} check for {} forbidden", slug, repository.name);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AccessResolver for TeamAccessResolver {
    async fn resolve(&self, repository: &RepositoryInfo) -> Resolution {
        if let Some(entries) = self.repository_teams(repository).await {
            return Resolution::complete(entries);
        }

        tracing::info!(
            "Team listing unavailable for {}, checking organization teams individually",
            repository.name
        );
        self.scan_teams(repository).await
    }

    fn name(&self) -> &str {
        "teams"
    }
}
