use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;

use crate::models::{
    AccessEntry, AccessReport, Permission, PermissionRow, RepositoryInfo, RepositorySnapshot,
    RepositorySummaryRow, SubjectSummaryRow,
};

/// Flattens snapshots into the detail rows and both summaries.
/// Pure: the same snapshots always give the same report, in the same order.
pub fn build_report(snapshots: &[RepositorySnapshot]) -> AccessReport {
    let mut permissions: Vec<PermissionRow> = snapshots
        .iter()
        .flat_map(|snapshot| {
            snapshot
                .access
                .iter()
                .map(move |entry| permission_row(&snapshot.info, entry))
        })
        .collect();
    permissions.sort_by(|a, b| {
        a.username
            .to_lowercase()
            .cmp(&b.username.to_lowercase())
            .then_with(|| a.repo_name.to_lowercase().cmp(&b.repo_name.to_lowercase()))
            .then_with(|| a.username.cmp(&b.username))
            .then_with(|| a.repo_full_name.cmp(&b.repo_full_name))
    });

    AccessReport {
        subjects: subject_summaries(snapshots),
        repositories: repository_summaries(snapshots),
        permissions,
    }
}

fn permission_row(repository: &RepositoryInfo, entry: &AccessEntry) -> PermissionRow {
    PermissionRow {
        username: entry.subject_id.clone(),
        user_name: entry.profile.display_name.clone(),
        user_type: entry.subject_type.clone(),
        user_company: entry.profile.company.clone(),
        user_location: entry.profile.location.clone(),
        repo_name: repository.name.clone(),
        repo_full_name: repository.full_name.clone(),
        permission: entry.permission.to_string(),
        is_private_repo: repository.is_private(),
        is_archived_repo: repository.archived,
        is_fork_repo: repository.fork,
        is_disabled_repo: repository.disabled,
        repo_updated_at: timestamp(repository.updated_at),
        repo_created_at: timestamp(repository.created_at),
        data_source: entry.source.as_str().to_string(),
    }
}

fn subject_summaries(snapshots: &[RepositorySnapshot]) -> Vec<SubjectSummaryRow> {
    let mut by_subject: HashMap<&str, SubjectSummaryRow> = HashMap::new();

    for snapshot in snapshots {
        let repository = &snapshot.info;
        for entry in &snapshot.access {
            let row = by_subject
                .entry(entry.subject_id.as_str())
                .or_insert_with(|| SubjectSummaryRow {
                    username: entry.subject_id.clone(),
                    user_name: entry.profile.display_name.clone(),
                    user_type: entry.subject_type.clone(),
                    user_company: entry.profile.company.clone(),
                    user_location: entry.profile.location.clone(),
                    ..Default::default()
                });

            row.total_repos += 1;
            match entry.permission {
                Permission::Admin => row.admin_repos += 1,
                Permission::Maintain => row.maintain_repos += 1,
                Permission::Write => row.write_repos += 1,
                Permission::Triage => row.triage_repos += 1,
                Permission::Read => row.read_repos += 1,
                Permission::Unknown => {}
            }
            if repository.is_private() {
                row.private_repos += 1;
            } else {
                row.public_repos += 1;
            }
            if repository.archived {
                row.archived_repos += 1;
            }
            if repository.fork {
                row.fork_repos += 1;
            } else {
                row.original_repos += 1;
            }
            if repository.disabled {
                row.disabled_repos += 1;
            }
        }
    }

    let mut rows: Vec<SubjectSummaryRow> = by_subject.into_values().collect();
    rows.sort_by(|a, b| {
        b.total_repos
            .cmp(&a.total_repos)
            .then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
            .then_with(|| a.username.cmp(&b.username))
    });
    rows
}

fn repository_summaries(snapshots: &[RepositorySnapshot]) -> Vec<RepositorySummaryRow> {
    let mut rows: Vec<RepositorySummaryRow> = snapshots
        .iter()
        .map(|snapshot| {
            let repository = &snapshot.info;
            let mut row = RepositorySummaryRow {
                repo_name: repository.name.clone(),
                repo_full_name: repository.full_name.clone(),
                is_private: repository.is_private(),
                is_archived: repository.archived,
                is_fork: repository.fork,
                is_disabled: repository.disabled,
                total_collaborators: snapshot.access.len() as u32,
                access_complete: snapshot.access_complete,
                updated_at: timestamp(repository.updated_at),
                created_at: timestamp(repository.created_at),
                ..Default::default()
            };
            for entry in &snapshot.access {
                match entry.permission {
                    Permission::Admin => row.admin_users += 1,
                    Permission::Maintain => row.maintain_users += 1,
                    Permission::Write => row.write_users += 1,
                    Permission::Triage => row.triage_users += 1,
                    Permission::Read => row.read_users += 1,
                    Permission::Unknown => {}
                }
            }
            row
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_collaborators
            .cmp(&a.total_collaborators)
            .then_with(|| a.repo_name.to_lowercase().cmp(&b.repo_name.to_lowercase()))
            .then_with(|| a.repo_full_name.cmp(&b.repo_full_name))
    });
    rows
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}
