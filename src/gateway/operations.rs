//! Operations the pages run against the gateway
//!
//! Every query lives in one shared document; callers pick the operation by
//! name. Missing result paths come back as `None`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::{GatewayClient, GatewayError, GraphQlResponse, Operation};
use crate::config::IssuesRepo;

pub const OPERATIONS_DOC: &str = r#"
query GitHubIssuesQuery(
  $first: Int = 50
  $name: String!
  $owner: String!
) {
  gitHub {
    repository(name: $name, owner: $owner) {
      issues(
        first: $first
        orderBy: { field: CREATED_AT, direction: DESC }
      ) {
        totalCount
        edges {
          node {
            ...GitHubIssueFragment
          }
        }
      }
    }
  }
}

query GitHubIssueQuery(
  $name: String!
  $owner: String!
  $number: Int!
) {
  gitHub {
    repository(name: $name, owner: $owner) {
      issue(number: $number) {
        ...GitHubIssueFragment
      }
    }
  }
}

fragment GitHubIssueFragment on GitHubIssue {
  title
  url
  body
  id
  number
  createdAt
  author {
    login
    avatarUrl
  }
  repository {
    openGraphImageUrl
  }
}

query FindMeOnGitHub {
  me {
    github {
      bio
      email
      databaseId
      login
      id
      name
    }
  }
}

query SupportedServicesQuery {
  oneGraph {
    services {
      service
      friendlyServiceName
      slug
      supportsOauthLogin
      supportsCustomServiceAuth
    }
  }
}

mutation CreateGitHubIssueMutation($input: GitHubCreateIssueInput!) {
  gitHub {
    createIssue(input: $input) {
      issue {
        id
        number
        url
      }
    }
  }
}
"#;

const MISSING_APP_ID_MESSAGE: &str = "app_id must be a valid UUID";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueAuthor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRepository {
    #[serde(default)]
    pub open_graph_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub body: String,
    pub created_at: String,
    #[serde(default)]
    pub author: Option<IssueAuthor>,
    #[serde(default)]
    pub repository: Option<IssueRepository>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<u64>,
}

impl GitHubUser {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }
}

/// Login provider offered by the gateway
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedService {
    pub service: String,
    pub friendly_service_name: String,
    pub slug: String,
    #[serde(default)]
    pub supports_oauth_login: bool,
    #[serde(default)]
    pub supports_custom_service_auth: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SupportedServices {
    pub services: Vec<SupportedService>,
    /// Gateway rejected the configured app id
    pub missing_app_id: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueInput {
    pub repository_id: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub number: u64,
    pub url: String,
}

/// Typed gateway operations bound to one app id
#[derive(Clone)]
pub struct GatewayApi {
    client: GatewayClient,
    app_id: String,
    server_side_access_token: Option<String>,
}

impl GatewayApi {
    pub fn new(
        client: GatewayClient,
        app_id: String,
        server_side_access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            app_id,
            server_side_access_token,
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    async fn run(
        &self,
        bearer_token: Option<&str>,
        operation_name: &str,
        variables: Value,
    ) -> Result<GraphQlResponse, GatewayError> {
        let operation = Operation::new(OPERATIONS_DOC, operation_name, variables);
        self.client
            .call(&self.app_id, bearer_token, &operation)
            .await
    }

    /// Most recent issues of `repo`, read with the server-side token
    pub async fn all_issues(
        &self,
        first: u32,
        repo: &IssuesRepo,
    ) -> Result<Option<Vec<Issue>>, GatewayError> {
        let response = self
            .run(
                self.server_side_access_token.as_deref(),
                "GitHubIssuesQuery",
                json!({ "owner": repo.owner, "name": repo.name, "first": first }),
            )
            .await?;
        Ok(issues_from(&response))
    }

    pub async fn issue(
        &self,
        access_token: Option<&str>,
        number: u64,
        repo: &IssuesRepo,
    ) -> Result<Option<Issue>, GatewayError> {
        let response = self
            .run(
                access_token,
                "GitHubIssueQuery",
                json!({ "owner": repo.owner, "name": repo.name, "number": number }),
            )
            .await?;
        Ok(extract(&response, &["gitHub", "repository", "issue"]))
    }

    pub async fn issue_with_server_side_token(
        &self,
        number: u64,
        repo: &IssuesRepo,
    ) -> Result<Option<Issue>, GatewayError> {
        self.issue(self.server_side_access_token.as_deref(), number, repo)
            .await
    }

    pub async fn find_me_on_github(
        &self,
        access_token: &str,
    ) -> Result<Option<GitHubUser>, GatewayError> {
        let response = self
            .run(Some(access_token), "FindMeOnGitHub", json!({}))
            .await?;
        Ok(extract(&response, &["me", "github"]))
    }

    pub async fn create_issue(
        &self,
        access_token: Option<&str>,
        input: &CreateIssueInput,
    ) -> Result<Option<CreatedIssue>, GatewayError> {
        let response = self
            .run(
                access_token,
                "CreateGitHubIssueMutation",
                json!({ "input": input }),
            )
            .await?;
        Ok(extract(&response, &["gitHub", "createIssue", "issue"]))
    }

    pub async fn create_issue_with_server_side_token(
        &self,
        input: &CreateIssueInput,
    ) -> Result<Option<CreatedIssue>, GatewayError> {
        self.create_issue(self.server_side_access_token.as_deref(), input)
            .await
    }

    /// Login providers, OAuth-capable only, sorted by display name ignoring case
    pub async fn supported_services(&self) -> Result<SupportedServices, GatewayError> {
        let response = self.run(None, "SupportedServicesQuery", json!({})).await?;
        Ok(supported_services_from(&response))
    }
}

/// Deserialize the value at `path`, treating absent or malformed data as `None`
fn extract<T: serde::de::DeserializeOwned>(response: &GraphQlResponse, path: &[&str]) -> Option<T> {
    let value = response.data_at(path)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                path = ?path,
                error = %e,
                "Unexpected shape in gateway response"
            );
            None
        }
    }
}

fn issues_from(response: &GraphQlResponse) -> Option<Vec<Issue>> {
    #[derive(Deserialize)]
    struct Edge {
        node: Issue,
    }

    let edges: Vec<Edge> = extract(response, &["gitHub", "repository", "issues", "edges"])?;
    Some(edges.into_iter().map(|e| e.node).collect())
}

fn supported_services_from(response: &GraphQlResponse) -> SupportedServices {
    let missing_app_id = response
        .first_error_message()
        .is_some_and(|m| m.contains(MISSING_APP_ID_MESSAGE));

    let mut services: Vec<SupportedService> =
        extract(response, &["oneGraph", "services"]).unwrap_or_default();
    services.retain(|s| s.supports_oauth_login);
    services.sort_by_cached_key(|s| s.friendly_service_name.to_lowercase());

    SupportedServices {
        services,
        missing_app_id,
    }
}
