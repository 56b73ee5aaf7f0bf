use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::{FetchError, FetchResult},
    model::{ProfileInfo, RepoInfo},
    source::{Fetch, SourceId, require_identifier, truncate_body},
};

const BASE_URL: &str = "https://api.github.com";

/// Source adapter for the GitHub REST API: user profiles and their most
/// recently updated repositories.
#[derive(Debug, Clone)]
pub struct GithubSource {
    http: Client,
    token: Option<String>,
    base_url: String,
}

impl GithubSource {
    pub fn new(http: Client, token: Option<String>) -> Self {
        Self { http, token, base_url: BASE_URL.to_string() }
    }

    /// Point the adapter at a different base URL (used by tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, url: String) -> RequestBuilder {
        let mut req = self.http.get(url).header("Accept", "application/vnd.github.v3+json");
        // Unauthenticated access works too, just with lower rate limits.
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("token {token}"));
        }
        req
    }

    /// Fetch one user's profile.
    pub async fn user(&self, username: &str) -> FetchResult<ProfileInfo> {
        let username = require_identifier(username, "username")?;

        debug!(username, "fetching GitHub profile");
        let res = self.request(format!("{}/users/{}", self.base_url, username)).send().await?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found("user", username));
        }

        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "GitHub user request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: GhUser = serde_json::from_str(&body)?;
        Ok(ProfileInfo {
            login: parsed.login,
            name: parsed.name,
            bio: parsed.bio,
            public_repos: parsed.public_repos,
            followers: parsed.followers,
            following: parsed.following,
            created_at: parsed.created_at,
            avatar_url: parsed.avatar_url,
            html_url: parsed.html_url,
        })
    }

    /// Fetch a user's most recently updated repositories, newest first.
    pub async fn repositories(&self, username: &str, limit: u32) -> FetchResult<Vec<RepoInfo>> {
        let username = require_identifier(username, "username")?;
        let per_page = limit.to_string();

        debug!(username, limit, "fetching GitHub repositories");
        let res = self
            .request(format!("{}/users/{}/repos", self.base_url, username))
            .query(&[("sort", "updated"), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found("user", username));
        }

        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::transport(format!(
                "GitHub repositories request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: Vec<GhRepo> = serde_json::from_str(&body)?;
        Ok(parsed
            .into_iter()
            .map(|repo| RepoInfo {
                name: repo.name,
                description: repo.description,
                language: repo.language,
                stars: repo.stargazers_count,
                forks: repo.forks_count,
                url: repo.html_url,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
    name: Option<String>,
    bio: Option<String>,
    public_repos: Option<u64>,
    followers: Option<u64>,
    following: Option<u64>,
    created_at: Option<DateTime<Utc>>,
    avatar_url: Option<String>,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    name: String,
    description: Option<String>,
    language: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    html_url: Option<String>,
}

#[async_trait]
impl Fetch for GithubSource {
    type Query = String;
    type Payload = ProfileInfo;

    fn id(&self) -> SourceId {
        SourceId::Github
    }

    async fn fetch(&self, query: &Self::Query) -> FetchResult<Self::Payload> {
        self.user(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, token: Option<&str>) -> GithubSource {
        GithubSource::new(Client::new(), token.map(str::to_string)).with_base_url(server.uri())
    }

    #[tokio::test]
    async fn user_maps_profile_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .and(header("Accept", "application/vnd.github.v3+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octocat",
                "name": "The Octocat",
                "bio": null,
                "public_repos": 8,
                "followers": 10000,
                "following": 9,
                "created_at": "2011-01-25T18:44:36Z",
                "avatar_url": "https://avatars.githubusercontent.com/u/583231",
                "html_url": "https://github.com/octocat"
            })))
            .mount(&server)
            .await;

        let profile = source(&server, None).user("octocat").await.unwrap();

        assert_eq!(profile.login, "octocat");
        assert_eq!(profile.public_repos, Some(8));
        assert_eq!(profile.followers, Some(10000));
        assert_eq!(profile.bio, None);
    }

    #[tokio::test]
    async fn missing_user_is_not_found_not_a_crash() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/nosuchuser"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = source(&server, None).user("nosuchuser").await.unwrap_err();
        assert_eq!(err, FetchError::not_found("user", "nosuchuser"));
    }

    #[tokio::test]
    async fn token_is_attached_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .and(header("Authorization", "token ghp_abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octocat"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = source(&server, Some("ghp_abc123")).user("octocat").await.unwrap();
        assert_eq!(profile.login, "octocat");
        assert_eq!(profile.followers, None);
    }

    #[tokio::test]
    async fn repositories_project_counts_and_urls() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("sort", "updated"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "name": "hello-world",
                    "description": "My first repository",
                    "language": "JavaScript",
                    "stargazers_count": 42,
                    "forks_count": 7,
                    "html_url": "https://github.com/octocat/hello-world"
                },
                {
                    "name": "spoon-knife",
                    "description": null,
                    "language": null,
                    "stargazers_count": 0,
                    "forks_count": 0,
                    "html_url": "https://github.com/octocat/spoon-knife"
                }
            ])))
            .mount(&server)
            .await;

        let repos = source(&server, None).repositories("octocat", 5).await.unwrap();

        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "hello-world");
        assert_eq!(repos[0].stars, Some(42));
        assert_eq!(repos[1].language, None);
        // A zero count is a value, not an unknown.
        assert_eq!(repos[1].stars, Some(0));
    }

    #[tokio::test]
    async fn identical_calls_yield_equal_payloads() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octocat",
                "public_repos": 8
            })))
            .expect(2)
            .mount(&server)
            .await;

        let source = source(&server, None);
        let first = source.user("octocat").await.unwrap();
        let second = source.user("octocat").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn server_errors_surface_as_transport() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = source(&server, None).user("octocat").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(err.to_string().contains("500"));
    }
}
