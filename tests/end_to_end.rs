use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use accessaudit::{build_report, AccessAudit, AuditConfig, ClientSettings, GitHubClient, ReportWriter, RunSummary};

async fn organization_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("repositories(first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "organization": { "repositories": {
                "totalCount": 2,
                "pageInfo": { "hasNextPage": false, "endCursor": "r2" },
                "nodes": [
                    {
                        "name": "alpha", "nameWithOwner": "acme/alpha",
                        "isPrivate": true, "isArchived": false, "isFork": false, "isDisabled": false,
                        "updatedAt": "2024-05-01T10:00:00Z", "createdAt": "2021-03-04T05:06:07Z"
                    },
                    {
                        "name": "beta", "nameWithOwner": "acme/beta",
                        "isPrivate": false, "isArchived": false, "isFork": true, "isDisabled": false,
                        "updatedAt": "2024-04-01T10:00:00Z", "createdAt": "2022-01-01T00:00:00Z"
                    }
                ]
            } } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("collaborators(first"))
        .and(body_partial_json(json!({ "variables": { "name": "alpha" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": { "collaborators": {
                "totalCount": 3,
                "pageInfo": { "hasNextPage": false, "endCursor": "c3" },
                "nodes": [
                    { "__typename": "User", "login": "alice", "name": "Alice", "company": "Acme", "location": "Berlin", "id": "U1" },
                    { "__typename": "User", "login": "bob", "name": "Bob", "id": "U2" },
                    { "__typename": "User", "login": "carol", "id": "U3" }
                ],
                "edges": [
                    { "permission": "ADMIN", "node": { "login": "alice" } },
                    { "permission": "WRITE", "node": { "login": "bob" } },
                    { "permission": "READ", "node": { "login": "carol" } }
                ]
            } } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("collaborators(first"))
        .and(body_partial_json(json!({ "variables": { "name": "beta" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "repository": { "collaborators": {
                "totalCount": 0,
                "pageInfo": { "hasNextPage": false, "endCursor": null },
                "nodes": [],
                "edges": []
            } } }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/alpha/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 11, "name": "Core", "slug": "core", "permission": "maintain" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/beta/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    server
}

fn client(server: &MockServer) -> Arc<GitHubClient> {
    let settings = ClientSettings {
        api_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        backoff_base: Duration::from_millis(10),
        ..Default::default()
    };
    Arc::new(GitHubClient::new("test-token", &settings).unwrap())
}

#[tokio::test]
async fn audits_two_repositories_end_to_end() {
    let server = organization_server().await;
    let audit = AccessAudit::new(client(&server), AuditConfig::new("acme").without_pauses());

    let run = audit.run().await;
    assert_eq!(run.snapshots.len(), 2);
    assert!(run.snapshots.iter().all(|s| s.access_complete));
    // repositories + 2 x collaborators + 2 x teams
    assert_eq!(run.queries, 5);

    let report = build_report(&run.snapshots);
    assert_eq!(report.permissions.len(), 4);

    let team = report
        .subjects
        .iter()
        .find(|row| row.username == "@acme/core")
        .unwrap();
    assert_eq!(team.user_type, "Team");
    assert_eq!(team.total_repos, 1);
    assert_eq!(team.maintain_repos, 1);
    assert_eq!(team.admin_repos, 0);
    assert_eq!(team.write_repos, 0);
    assert_eq!(team.triage_repos, 0);
    assert_eq!(team.read_repos, 0);

    let alice = report.subjects.iter().find(|row| row.username == "alice").unwrap();
    assert_eq!(alice.admin_repos, 1);
    assert_eq!(alice.user_company, "Acme");

    let alpha = &report.repositories[0];
    assert_eq!(alpha.repo_full_name, "acme/alpha");
    assert_eq!(alpha.total_collaborators, 4);
    assert_eq!(
        (alpha.admin_users, alpha.maintain_users, alpha.write_users, alpha.read_users),
        (1, 1, 1, 1)
    );
    let beta = &report.repositories[1];
    assert_eq!(beta.total_collaborators, 0);
    assert!(beta.is_fork);

    let summary = RunSummary::new(&run, &report);
    assert_eq!(summary.users, 3);
    assert_eq!(summary.teams, 1);
    assert_eq!(summary.completeness(), 50.0);
}

#[tokio::test]
async fn written_reports_are_identical_across_runs() {
    let server = organization_server().await;
    let dir = std::env::temp_dir().join(format!("accessaudit-e2e-{}", std::process::id()));

    let mut contents = Vec::new();
    for _ in 0..2 {
        let audit = AccessAudit::new(client(&server), AuditConfig::new("acme").without_pauses());
        let run = audit.run().await;
        let report = build_report(&run.snapshots);
        let files = ReportWriter::new(&dir, "acme").write(&report).unwrap();

        contents.push((
            std::fs::read_to_string(&files.permissions).unwrap(),
            std::fs::read_to_string(&files.subjects).unwrap(),
            std::fs::read_to_string(&files.repositories).unwrap(),
        ));
    }

    assert_eq!(contents[0], contents[1]);

    let detail = &contents[0].0;
    assert!(detail.starts_with("username,user_name,user_type,"));
    assert!(detail.contains(
        "@acme/core,Core,Team,,,alpha,acme/alpha,maintain,true,false,false,false,2024-05-01T10:00:00Z,2021-03-04T05:06:07Z,repo-teams"
    ));

    std::fs::remove_dir_all(&dir).unwrap();
}
