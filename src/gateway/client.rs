use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One GraphQL operation against the gateway
#[derive(Debug, Clone)]
pub struct Operation<'a> {
    pub document: &'a str,
    pub variables: Value,
    pub operation_name: &'a str,
}

impl<'a> Operation<'a> {
    pub fn new(document: &'a str, operation_name: &'a str, variables: Value) -> Self {
        Self {
            document,
            variables,
            operation_name,
        }
    }
}

/// Wire body of a GraphQL POST
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: &'a Value,
    operation_name: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl GraphQlResponse {
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Follow a path of object keys into `data`
    pub fn data_at(&self, path: &[&str]) -> Option<&Value> {
        path.iter()
            .try_fold(self.data.as_ref()?, |value, key| value.get(*key))
            .filter(|value| !value.is_null())
    }

    /// First error message, if the gateway reported any
    pub fn first_error_message(&self) -> Option<&str> {
        self.errors
            .as_ref()?
            .first()?
            .get("message")?
            .as_str()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to build gateway HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("gateway request for {operation} failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("gateway returned {status} for {operation}: {body}")]
    Status {
        operation: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("gateway response for {operation} is not GraphQL JSON: {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },
}

/// HTTP client for the gateway's `/graphql` endpoint
///
/// No retries. GraphQL-level `errors` are logged and handed back with the
/// response; only transport-level failures become `GatewayError`.
#[derive(Clone)]
pub struct GatewayClient {
    graphql_url: String,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(
        graphql_url: String,
        connect_timeout_secs: u64,
        request_timeout_secs: u64,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self { graphql_url, http })
    }

    /// POST an operation to `<graphql_url>?app_id=<app_id>`
    ///
    /// The `Authorization` header is only sent when `bearer_token` is given.
    pub async fn call(
        &self,
        app_id: &str,
        bearer_token: Option<&str>,
        operation: &Operation<'_>,
    ) -> Result<GraphQlResponse, GatewayError> {
        let body = GraphQlRequest {
            query: operation.document,
            variables: &operation.variables,
            operation_name: operation.operation_name,
        };

        let mut request = self
            .http
            .post(&self.graphql_url)
            .query(&[("app_id", app_id)])
            .json(&body);
        if let Some(token) = bearer_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(
            operation = operation.operation_name,
            authenticated = bearer_token.is_some(),
            "Calling gateway"
        );

        let response = request.send().await.map_err(|source| GatewayError::Transport {
            operation: operation.operation_name.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport {
                operation: operation.operation_name.to_string(),
                source,
            })?;

        if !status.is_success() {
            tracing::error!(
                operation = operation.operation_name,
                status = %status,
                "Gateway returned non-success status"
            );
            return Err(GatewayError::Status {
                operation: operation.operation_name.to_string(),
                status,
                body: text,
            });
        }

        let parsed = parse_response(operation.operation_name, &text)?;
        if parsed.has_errors() {
            tracing::warn!(
                operation = operation.operation_name,
                errors = ?parsed.errors,
                "Errors in GraphQL response"
            );
        }

        Ok(parsed)
    }
}

fn parse_response(operation_name: &str, body: &str) -> Result<GraphQlResponse, GatewayError> {
    serde_json::from_str(body).map_err(|source| GatewayError::Decode {
        operation: operation_name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Captured = (HeaderMap, HashMap<String, String>, Value);

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Captured>>>);

    async fn record_graphql(
        State(recorder): State<Recorder>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        recorder.0.lock().unwrap().push((headers, query, body));
        Json(json!({ "data": { "a": 1 }, "errors": [{ "message": "partial failure" }] }))
    }

    async fn stub_gateway(recorder: Recorder) -> String {
        let router = Router::new()
            .route("/graphql", post(record_graphql))
            .route(
                "/broken",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
            )
            .with_state(recorder);
        spawn_stub(router).await
    }

    #[tokio::test]
    async fn test_call_sends_graphql_post() {
        let recorder = Recorder::default();
        let base = stub_gateway(recorder.clone()).await;
        let client = GatewayClient::new(format!("{}/graphql", base), 1, 5).unwrap();
        let operation = Operation::new("query Q { a }", "Q", json!({ "n": 1 }));

        let with_token = client.call("app 1", Some("tok"), &operation).await.unwrap();
        // GraphQL errors come back with the data instead of failing the call
        assert!(with_token.has_errors());
        assert_eq!(with_token.first_error_message(), Some("partial failure"));
        assert_eq!(with_token.data_at(&["a"]), Some(&json!(1)));

        client.call("app 1", None, &operation).await.unwrap();

        let calls = recorder.0.lock().unwrap();
        assert_eq!(calls.len(), 2);

        let (headers, query, body) = &calls[0];
        assert_eq!(headers["authorization"], "Bearer tok");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(query["app_id"], "app 1");
        assert_eq!(
            body,
            &json!({ "query": "query Q { a }", "variables": { "n": 1 }, "operationName": "Q" })
        );

        let (headers, query, _) = &calls[1];
        assert!(headers.get("authorization").is_none());
        assert_eq!(query["app_id"], "app 1");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base = stub_gateway(Recorder::default()).await;
        let client = GatewayClient::new(format!("{}/broken", base), 1, 5).unwrap();
        let operation = Operation::new("query Q { a }", "Q", json!({}));

        let result = client.call("app", None, &operation).await;
        let Err(GatewayError::Status {
            operation,
            status,
            body,
        }) = result
        else {
            panic!("expected a status error, got {:?}", result);
        };
        assert_eq!(operation, "Q");
        assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "upstream down");
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GatewayClient::new(format!("http://{}/graphql", addr), 1, 5).unwrap();
        let result = client
            .call("app", None, &Operation::new("query Q { a }", "Q", json!({})))
            .await;
        assert!(matches!(result, Err(GatewayError::Transport { .. })));
    }

    #[test]
    fn test_request_body_shape() {
        let variables = json!({ "number": 10 });
        let body = GraphQlRequest {
            query: "query Q { a }",
            variables: &variables,
            operation_name: "Q",
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "query": "query Q { a }", "variables": { "number": 10 }, "operationName": "Q" })
        );
    }

    #[test]
    fn test_errors_are_returned_not_raised() {
        let response = parse_response(
            "Q",
            r#"{"data":{"a":null},"errors":[{"message":"app_id must be a valid UUID"}]}"#,
        )
        .unwrap();

        assert!(response.has_errors());
        assert_eq!(
            response.first_error_message(),
            Some("app_id must be a valid UUID")
        );
        assert!(response.data_at(&["a"]).is_none());
    }

    #[test]
    fn test_empty_errors_array_is_not_an_error() {
        let response = parse_response("Q", r#"{"data":{},"errors":[]}"#).unwrap();
        assert!(!response.has_errors());
    }

    #[test]
    fn test_data_at_follows_path() {
        let response = parse_response(
            "Q",
            r#"{"data":{"gitHub":{"repository":{"issue":{"number":3}}}}}"#,
        )
        .unwrap();

        assert_eq!(
            response.data_at(&["gitHub", "repository", "issue", "number"]),
            Some(&json!(3))
        );
        assert!(response.data_at(&["gitHub", "nope"]).is_none());
    }

    #[test]
    fn test_non_json_body_is_decode_error() {
        let err = parse_response("Q", "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }

    #[test]
    fn test_client_builds_without_network() {
        assert!(GatewayClient::new("https://gateway.invalid/graphql".to_string(), 1, 1).is_ok());
    }
}
