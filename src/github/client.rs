use chrono::Utc;
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::{sleep, Duration};

use crate::config::ClientSettings;
use crate::error::{Error, Result};
use crate::github::queries::{
    self, GraphQLError, GraphQLRequest, GraphQLResponse, OrganizationAccess, OrganizationAccessData,
    RateLimitData, Viewer, ViewerData,
};
use crate::github::rate_limiter::{RateLimitState, RateLimiter};
use crate::github::repeat::{retry, LoopPolicy};

const MAX_WAIT_ROUNDS: u32 = 3;

/// Result of a REST lookup where "absent" and "hidden" are ordinary answers.
#[derive(Debug, Clone, PartialEq)]
pub enum RestOutcome {
    Found { body: Value, has_next: bool },
    NotFound,
    Forbidden,
}

/// Rate-limited executor for GraphQL and REST calls against one GitHub host.
pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    retry_policy: LoopPolicy,
    backoff_base: Duration,
    graphql_url: String,
    rest_url: String,
    queries: AtomicU64,
}

impl GitHubClient {
    pub fn new(token: &str, settings: &ClientSettings) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("accessaudit/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()?;

        let base = settings.api_url.trim_end_matches('/');

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(settings.rate_limit_threshold, settings.rate_limit_buffer),
            retry_policy: LoopPolicy::retries(settings.max_retries, settings.backoff_base),
            backoff_base: settings.backoff_base,
            graphql_url: format!("{}/graphql", base),
            rest_url: base.to_string(),
            queries: AtomicU64::new(0),
        })
    }

    /// Runs a GraphQL document and deserializes its `data` payload.
    pub async fn query<T: DeserializeOwned>(&self, document: &str, variables: Value) -> Result<T> {
        self.query_with(&self.retry_policy, document, variables).await
    }

    async fn query_with<T: DeserializeOwned>(
        &self,
        policy: &LoopPolicy,
        document: &str,
        variables: Value,
    ) -> Result<T> {
        let data = retry(
            policy,
            "GraphQL request",
            |_| self.graphql_attempt(document, &variables),
            Error::is_retryable,
        )
        .await?;

        serde_json::from_value(data).map_err(|e| Error::ParseError(e.to_string()))
    }

    async fn graphql_attempt(&self, document: &str, variables: &Value) -> Result<Value> {
        self.wait_for_capacity().await;
        let response = self.send_graphql(document, variables).await?;
        self.interpret_graphql(response).await
    }

    async fn send_graphql(&self, document: &str, variables: &Value) -> Result<Response> {
        let body = GraphQLRequest {
            query: document,
            variables,
        };
        let response = self.client.post(&self.graphql_url).json(&body).send().await?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.rate_limiter.update_from_headers(response.headers()).await;
        Ok(response)
    }

    async fn interpret_graphql(&self, response: Response) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            let payload: GraphQLResponse = response.json().await?;
            return partition_errors(payload);
        }
        Err(self.failure_for(response).await)
    }

    /// GET relative to the REST root, e.g. `/repos/acme/api/teams?per_page=100`.
    pub async fn rest_get(&self, path: &str, accept: Option<&'static str>) -> Result<RestOutcome> {
        retry(
            &self.retry_policy,
            "REST request",
            |_| self.rest_attempt(path, accept),
            Error::is_retryable,
        )
        .await
    }

    async fn rest_attempt(&self, path: &str, accept: Option<&'static str>) -> Result<RestOutcome> {
        self.wait_for_capacity().await;

        let url = format!("{}{}", self.rest_url, path);
        let mut request = self.client.get(&url);
        if let Some(accept) = accept {
            request = request.header(header::ACCEPT, accept);
        }

        tracing::debug!("Fetching: {}", url);
        let response = request.send().await?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.rate_limiter.update_from_headers(response.headers()).await;

        let status = response.status();
        if status.is_success() {
            let has_next = has_next_link(response.headers());
            let body = if status == StatusCode::NO_CONTENT {
                Value::Null
            } else {
                response.json().await?
            };
            return Ok(RestOutcome::Found { body, has_next });
        }

        match status {
            StatusCode::NOT_FOUND => Ok(RestOutcome::NotFound),
            StatusCode::FORBIDDEN if !quota_exhausted(response.headers()) => Ok(RestOutcome::Forbidden),
            _ => Err(self.failure_for(response).await),
        }
    }

    /// Maps a non-success response onto the error taxonomy. Throttling also
    /// pins the limiter so the next attempt waits the window out.
    async fn failure_for(&self, response: Response) -> Error {
        let status = response.status();
        if status.is_server_error() {
            return Error::ServerError(status.as_u16());
        }

        if status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && quota_exhausted(response.headers()))
        {
            let headers = response.headers();
            let retry_after = retry_after_secs(headers);
            // An explicit reset header was already recorded by the caller.
            if headers.contains_key(header::RETRY_AFTER) || !headers.contains_key("x-ratelimit-reset") {
                let reset_at = Utc::now() + chrono::Duration::seconds(retry_after as i64);
                self.rate_limiter.record(0, Some(reset_at)).await;
            }
            return Error::RateLimited(retry_after);
        }

        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(500).collect();
        Error::GitHubApi(format!("request failed with status {}: {}", status, body))
    }

    /// Blocks while the known quota is under the threshold, then re-reads it.
    /// One caller waits and probes per window; the rest queue and re-check.
    async fn wait_for_capacity(&self) {
        if self.rate_limiter.pause_needed().await.is_some() {
            let _turn = self.rate_limiter.wait_turn().await;
            let mut rounds = 0;

            while let Some(pause) = self.rate_limiter.pause_needed().await {
                if rounds == MAX_WAIT_ROUNDS {
                    tracing::warn!(
                        "Rate limit still low after {} waits, continuing anyway",
                        MAX_WAIT_ROUNDS
                    );
                    break;
                }
                rounds += 1;

                let state = self.rate_limiter.snapshot().await;
                tracing::warn!(
                    "Rate limit low ({} remaining, threshold {}), waiting {}s for reset",
                    state.remaining.unwrap_or_default(),
                    self.rate_limiter.threshold(),
                    pause.as_secs()
                );
                sleep(pause).await;
                self.rate_limiter.clear().await;

                match self.refresh_rate_limit().await {
                    Ok(state) => tracing::info!(
                        "Rate limit after reset: {} remaining",
                        state
                            .remaining
                            .map(|r| r.to_string())
                            .unwrap_or_else(|| "unknown".to_string())
                    ),
                    Err(e) => tracing::warn!("Could not re-check rate limit: {}", e),
                }
            }
        }
        self.rate_limiter.admit().await;
    }

    /// Single probe of the `rateLimit` object; bypasses the capacity wait.
    pub async fn refresh_rate_limit(&self) -> Result<RateLimitState> {
        let response = self.send_graphql(queries::RATE_LIMIT, &json!({})).await?;
        let data = self.interpret_graphql(response).await?;
        let parsed: RateLimitData = serde_json::from_value(data)?;
        if let Some(info) = parsed.rate_limit {
            self.rate_limiter.record(info.remaining, Some(info.reset_at)).await;
        }
        Ok(self.rate_limiter.snapshot().await)
    }

    /// Connectivity and authentication check.
    pub async fn verify_connection(&self) -> Result<Viewer> {
        tracing::info!("Testing GitHub API connection and authentication...");
        let policy = LoopPolicy::retries(2, self.backoff_base);
        let data: ViewerData = self.query_with(&policy, queries::VIEWER, json!({})).await?;

        let viewer = data
            .viewer
            .ok_or_else(|| Error::GitHubApi("API connection test returned no viewer".to_string()))?;

        tracing::info!("Authenticated as: {}", viewer.login);
        if let Some(rate) = data.rate_limit {
            self.rate_limiter.record(rate.remaining, Some(rate.reset_at)).await;
            tracing::info!(
                "GraphQL rate limit: {}/{} remaining, resets at {}",
                rate.remaining,
                rate.limit.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string()),
                rate.reset_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }

        Ok(viewer)
    }

    /// Confirms the organization is visible to the token.
    pub async fn verify_organization(&self, organization: &str) -> Result<OrganizationAccess> {
        tracing::info!("Checking token permissions for organization: {}", organization);
        let data: OrganizationAccessData = self
            .query(queries::ORGANIZATION_ACCESS, json!({ "org": organization }))
            .await?;

        let Some(access) = data.organization else {
            let available: Vec<String> = data
                .viewer
                .and_then(|v| v.organizations)
                .map(|orgs| orgs.nodes.into_iter().flatten().map(|o| o.login).take(10).collect())
                .unwrap_or_default();
            if !available.is_empty() {
                tracing::info!("Available organizations: {}", available.join(", "));
            }
            return Err(Error::OrganizationNotFound(organization.to_string()));
        };

        tracing::info!(
            "Organization access: {} (member: {}, admin: {})",
            access.login,
            if access.viewer_is_a_member { "yes" } else { "no" },
            if access.viewer_can_administer { "yes" } else { "no" }
        );
        if !access.viewer_is_a_member {
            tracing::warn!("Token owner is not a member of {}; some private repositories may not be accessible", organization);
        }

        Ok(access)
    }

    /// Number of requests that received an HTTP response so far.
    pub fn queries_made(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

/// Splits GraphQL errors into expected permission denials and real failures.
/// Data is kept whenever the server returned any.
pub(crate) fn partition_errors(response: GraphQLResponse) -> Result<Value> {
    let (forbidden, other): (Vec<GraphQLError>, Vec<GraphQLError>) =
        response.errors.into_iter().partition(GraphQLError::is_forbidden);

    if !forbidden.is_empty() {
        tracing::warn!(
            "Access denied for {} resources (insufficient permissions); normal for private repositories the token cannot access",
            forbidden.len()
        );
    }
    if !other.is_empty() {
        tracing::error!("GraphQL errors: {}", join_messages(&other));
    }

    match response.data {
        Some(data) if !data.is_null() => Ok(data),
        _ if !other.is_empty() => Err(Error::GraphQL(join_messages(&other))),
        _ if !forbidden.is_empty() => Err(Error::AccessDenied(join_messages(&forbidden))),
        _ => Err(Error::GraphQL("response carried no data".to_string())),
    }
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn has_next_link(headers: &header::HeaderMap) -> bool {
    headers
        .get("link")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("rel=\"next\""))
        .unwrap_or(false)
}

fn quota_exhausted(headers: &header::HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
        || headers.contains_key(header::RETRY_AFTER)
}

fn retry_after_secs(headers: &header::HeaderMap) -> u64 {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer) -> ClientSettings {
        ClientSettings {
            api_url: server.uri(),
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            backoff_base: Duration::from_millis(10),
            rate_limit_threshold: 100,
            rate_limit_buffer: Duration::from_millis(300),
        }
    }

    #[tokio::test]
    async fn retries_server_error_then_returns_second_payload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "attempt": 2 } })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        let data: Value = client.query("query { attempt }", json!({})).await.unwrap();

        assert_eq!(data, json!({ "attempt": 2 }));
        assert_eq!(client.queries_made(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_retry_ceiling() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        let result: Result<Value> = client.query("query { x }", json!({})).await;

        assert!(matches!(result, Err(Error::ServerError(503))));
        assert_eq!(client.queries_made(), 4);
    }

    #[tokio::test]
    async fn forbidden_errors_keep_partial_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "organization": { "repositories": { "nodes": [{ "name": "api" }, null] } } },
                "errors": [{ "type": "FORBIDDEN", "message": "Resource not accessible", "path": ["organization", "repositories", "nodes", 1] }]
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        let data: Value = client.query("query { x }", json!({})).await.unwrap();

        assert_eq!(data["organization"]["repositories"]["nodes"][0]["name"], "api");
        assert_eq!(client.queries_made(), 1);
    }

    #[test]
    fn other_errors_without_data_fail_the_call() {
        let response: GraphQLResponse = serde_json::from_value(json!({
            "errors": [{ "type": "INTERNAL", "message": "Something went wrong" }]
        }))
        .unwrap();
        assert!(matches!(partition_errors(response), Err(Error::GraphQL(_))));

        let response: GraphQLResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "type": "FORBIDDEN", "message": "Resource not accessible" }]
        }))
        .unwrap();
        assert!(matches!(partition_errors(response), Err(Error::AccessDenied(_))));
    }

    #[tokio::test]
    async fn low_quota_blocks_until_reset_plus_buffer() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("rateLimit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "rateLimit": { "limit": 5000, "remaining": 5000, "resetAt": "2099-01-01T00:00:00Z", "used": 0 } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "ok": true } })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        client
            .rate_limiter()
            .seed(RateLimitState {
                remaining: Some(50),
                reset_at: Some(Utc::now() + chrono::Duration::seconds(1)),
            })
            .await;

        let started = Instant::now();
        let data: Value = client.query("query { ok }", json!({})).await.unwrap();

        assert_eq!(data, json!({ "ok": true }));
        assert!(started.elapsed() >= Duration::from_millis(1200));
        assert_eq!(client.rate_limiter().snapshot().await.remaining, Some(4999));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn still_low_after_probe_waits_again() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("rateLimit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "rateLimit": {
                    "limit": 5000,
                    "remaining": 10,
                    "resetAt": (Utc::now() + chrono::Duration::seconds(1)).to_rfc3339(),
                    "used": 4990
                } }
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("rateLimit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "rateLimit": { "limit": 5000, "remaining": 5000, "resetAt": "2099-01-01T00:00:00Z", "used": 0 } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "ok": true } })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        client
            .rate_limiter()
            .seed(RateLimitState {
                remaining: Some(50),
                reset_at: Some(Utc::now() + chrono::Duration::milliseconds(200)),
            })
            .await;

        let _: Value = client.query("query { ok }", json!({})).await.unwrap();

        let probes = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| String::from_utf8_lossy(&r.body).contains("rateLimit"))
            .count();
        assert_eq!(probes, 2);
        assert_eq!(client.rate_limiter().snapshot().await.remaining, Some(4999));
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_wait() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(body_string_contains("rateLimit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "rateLimit": { "limit": 5000, "remaining": 5000, "resetAt": "2099-01-01T00:00:00Z", "used": 0 } }
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "full_name": "acme/api" })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        client
            .rate_limiter()
            .seed(RateLimitState {
                remaining: Some(5),
                reset_at: Some(Utc::now() + chrono::Duration::milliseconds(500)),
            })
            .await;

        let calls = (0..4).map(|_| client.rest_get("/repos/acme/api", None));
        let results = futures::future::join_all(calls).await;
        assert!(results.iter().all(|r| matches!(r, Ok(RestOutcome::Found { .. }))));

        let probes = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "POST")
            .count();
        assert_eq!(probes, 1);
        assert_eq!(client.rate_limiter().snapshot().await.remaining, Some(4996));
    }

    #[tokio::test]
    async fn timed_out_request_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({ "data": { "attempt": 1 } })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "attempt": 2 } })))
            .mount(&server)
            .await;

        let client = GitHubClient::new(
            "token",
            &ClientSettings {
                request_timeout: Duration::from_millis(300),
                ..settings(&server)
            },
        )
        .unwrap();
        let data: Value = client.query("query { attempt }", json!({})).await.unwrap();

        assert_eq!(data, json!({ "attempt": 2 }));
        assert_eq!(client.queries_made(), 1);
    }

    #[tokio::test]
    async fn timeouts_surface_as_retryable_network_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = GitHubClient::new(
            "token",
            &ClientSettings {
                request_timeout: Duration::from_millis(100),
                max_retries: 1,
                ..settings(&server)
            },
        )
        .unwrap();
        let result = client.rest_get("/repos/acme/slow", None).await;

        match result {
            Err(e @ Error::Network(_)) => assert!(e.is_retryable()),
            other => panic!("expected a network timeout, got {:?}", other),
        }
        assert_eq!(client.queries_made(), 0);
    }

    #[tokio::test]
    async fn response_headers_feed_the_limiter() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-remaining", "4321")
                    .insert_header("x-ratelimit-reset", "1700000000")
                    .set_body_json(json!({ "data": {} })),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        let _: Value = client.query("query { x }", json!({})).await.unwrap();

        let state = client.rate_limiter().snapshot().await;
        assert_eq!(state.remaining, Some(4321));
        assert_eq!(state.reset_at, chrono::DateTime::from_timestamp(1_700_000_000, 0));
    }

    #[tokio::test]
    async fn rest_maps_not_found_forbidden_and_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/api/teams"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", "<https://api.github.com/repos/acme/api/teams?page=2>; rel=\"next\"")
                    .set_body_json(json!([{ "slug": "core", "permission": "push" }])),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/hidden/teams"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();

        let found = client.rest_get("/repos/acme/api/teams", None).await.unwrap();
        assert_eq!(
            found,
            RestOutcome::Found {
                body: json!([{ "slug": "core", "permission": "push" }]),
                has_next: true
            }
        );

        let missing = client.rest_get("/repos/acme/nope/teams", None).await.unwrap();
        assert_eq!(missing, RestOutcome::NotFound);

        let hidden = client.rest_get("/repos/acme/hidden/teams", None).await.unwrap();
        assert_eq!(hidden, RestOutcome::Forbidden);
    }

    #[tokio::test]
    async fn unknown_organization_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "organization": null,
                    "viewer": { "login": "octocat", "organizations": { "nodes": [{ "login": "other" }] } }
                },
                "errors": [{ "type": "NOT_FOUND", "message": "Could not resolve to an Organization" }]
            })))
            .mount(&server)
            .await;

        let client = GitHubClient::new("token", &settings(&server)).unwrap();
        let result = client.verify_organization("ghost").await;

        assert!(matches!(result, Err(Error::OrganizationNotFound(org)) if org == "ghost"));
    }
}
