//! HTTP rule store client backed by reqwest.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use rf_core::rule::{RenamePayload, Rule, RuleId, RuleSummary, RunRequest, SavePayload};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::{RuleStore, StoreError};

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

/// Rule store reached over REST.
#[derive(Debug, Clone)]
pub struct HttpRuleStore {
    http: HttpClient,
    base_url: Url,
}

impl HttpRuleStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{collection}/` or `{base}/{collection}/{id}/`, ids percent-encoded.
    fn endpoint(&self, collection: &str, id: Option<&RuleId>) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Config(format!("base url {} cannot be a base", self.base_url)))?;
            segments.pop_if_empty().push(collection);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
            segments.push("");
        }
        Ok(url)
    }

    /// Send and map non-2xx responses to errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let path = response.url().path().to_string();
        let body = read_body(response).await;
        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound { path, body });
        }
        tracing::warn!(%path, status = status.as_u16(), "rule store request failed");
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Body as JSON when it parses, else as a string; empty bodies are null.
async fn read_body(response: Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[async_trait]
impl RuleStore for HttpRuleStore {
    async fn get_rule(&self, id: &RuleId) -> Result<Rule, StoreError> {
        let url = self.endpoint("rules", Some(id))?;
        let response = self.send(self.http.get(url)).await?;
        Ok(response.json().await?)
    }

    async fn list_rules(&self, search: &str) -> Result<Vec<RuleSummary>, StoreError> {
        let mut url = self.endpoint("rules", None)?;
        url.query_pairs_mut().append_pair("search", search);
        let response = self.send(self.http.get(url)).await?;
        let body: Value = response.json().await?;
        // Plain list, or a paginated `{results: [...]}` envelope.
        let items = match body {
            Value::Object(mut page) => page.remove("results").unwrap_or(Value::Null),
            other => other,
        };
        serde_json::from_value(items).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn create_rule(&self, payload: &SavePayload, key: Uuid) -> Result<Rule, StoreError> {
        let url = self.endpoint("rules", None)?;
        let request = self
            .http
            .post(url)
            .header(IDEMPOTENCY_HEADER, key.to_string())
            .json(payload);
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn patch_rule(&self, id: &RuleId, payload: &SavePayload, key: Uuid) -> Result<(), StoreError> {
        let url = self.endpoint("rules", Some(id))?;
        let request = self
            .http
            .patch(url)
            .header(IDEMPOTENCY_HEADER, key.to_string())
            .json(payload);
        self.send(request).await?;
        Ok(())
    }

    async fn put_rule(&self, id: &RuleId, payload: &SavePayload, key: Uuid) -> Result<(), StoreError> {
        let url = self.endpoint("rules", Some(id))?;
        let request = self
            .http
            .put(url)
            .header(IDEMPOTENCY_HEADER, key.to_string())
            .json(payload);
        self.send(request).await?;
        Ok(())
    }

    async fn rename_rule(&self, id: &RuleId, name: &str) -> Result<(), StoreError> {
        let url = self.endpoint("rules", Some(id))?;
        let body = RenamePayload { name: name.into() };
        self.send(self.http.patch(url).json(&body)).await?;
        Ok(())
    }

    async fn delete_rule(&self, id: &RuleId) -> Result<(), StoreError> {
        let url = self.endpoint("rules", Some(id))?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn run_rule(&self, id: &RuleId, request: &RunRequest) -> Result<Value, StoreError> {
        let url = self.endpoint("webhook", Some(id))?;
        let response = self.send(self.http.post(url).json(request)).await?;
        Ok(read_body(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::graph::Definition;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> HttpRuleStore {
        let config = StoreConfig::new(&server.uri()).unwrap();
        HttpRuleStore::new(&config).unwrap()
    }

    fn payload() -> SavePayload {
        SavePayload {
            definition: Definition::default(),
            name: "Rule 1".into(),
        }
    }

    #[tokio::test]
    async fn get_rule_decodes_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rules/7/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "name": "Orders",
                "definition": {"nodes": [], "edges": []},
                "updated_at": "2024-01-01T00:00:00Z"
            })))
            .mount(&mock_server)
            .await;

        let rule = store(&mock_server).get_rule(&RuleId::from(7u64)).await.unwrap();
        assert_eq!(rule.id.as_str(), "7");
        assert_eq!(rule.name, "Orders");
    }

    #[tokio::test]
    async fn missing_rule_is_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rules/404/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
            .mount(&mock_server)
            .await;

        let err = store(&mock_server).get_rule(&"404".into()).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                path: "/rules/404/".into(),
                body: json!({"detail": "Not found."}),
            }
        );
    }

    #[tokio::test]
    async fn missing_webhook_keeps_server_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/1/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "workflow not found"})))
            .mount(&mock_server)
            .await;

        let request = RunRequest {
            definition: Definition::default(),
        };
        let err = store(&mock_server).run_rule(&"1".into(), &request).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(err.payload(), json!({"error": "workflow not found"}));
    }

    #[tokio::test]
    async fn empty_not_found_falls_back_to_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rules/3/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = store(&mock_server).delete_rule(&"3".into()).await.unwrap_err();
        assert_eq!(err.payload(), json!("not found: /rules/3/"));
    }

    #[tokio::test]
    async fn list_rules_sends_search_and_accepts_pages() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rules/"))
            .and(query_param("search", "ord"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Orders"}
            ])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rules/"))
            .and(query_param("search", "paged"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [{"id": 2, "name": "Paged"}]
            })))
            .mount(&mock_server)
            .await;

        let store = store(&mock_server);
        let rules = store.list_rules("ord").await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "Orders");
        let paged = store.list_rules("paged").await.unwrap();
        assert_eq!(paged[0].id.as_str(), "2");
    }

    #[tokio::test]
    async fn create_posts_payload_with_idempotency_key() {
        let mock_server = MockServer::start().await;
        let key = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/rules/"))
            .and(header(IDEMPOTENCY_HEADER, key.to_string().as_str()))
            .and(body_json(json!({"definition": {"nodes": [], "edges": []}, "name": "Rule 1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 12, "name": "Rule 1"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let rule = store(&mock_server).create_rule(&payload(), key).await.unwrap();
        assert_eq!(rule.id.as_str(), "12");
    }

    #[tokio::test]
    async fn failed_patch_carries_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rules/3/"))
            .and(header_exists(IDEMPOTENCY_HEADER))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"name": ["required"]})))
            .mount(&mock_server)
            .await;

        let err = store(&mock_server)
            .patch_rule(&"3".into(), &payload(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Status {
                status: 400,
                body: json!({"name": ["required"]})
            }
        );
    }

    #[tokio::test]
    async fn put_and_delete_succeed_on_2xx() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/rules/3/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/rules/3/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = store(&mock_server);
        store.put_rule(&"3".into(), &payload(), Uuid::new_v4()).await.unwrap();
        store.delete_rule(&"3".into()).await.unwrap();
    }

    #[tokio::test]
    async fn rename_patches_only_the_name() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rules/5/"))
            .and(body_json(json!({"name": "Renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "name": "Renamed"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        store(&mock_server).rename_rule(&"5".into(), "Renamed").await.unwrap();
    }

    #[tokio::test]
    async fn run_returns_body_verbatim_and_failed_runs_keep_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook/1/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "context": {"a": {"x": 1}}
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/webhook/2/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "error": "Graph has cycles"
            })))
            .mount(&mock_server)
            .await;

        let store = store(&mock_server);
        let request = RunRequest {
            definition: Definition::default(),
        };
        let ok = store.run_rule(&"1".into(), &request).await.unwrap();
        assert_eq!(ok["context"]["a"]["x"], 1);

        let err = store.run_rule(&"2".into(), &request).await.unwrap_err();
        assert_eq!(err.payload()["error"], "Graph has cycles");
    }

    #[tokio::test]
    async fn plain_text_error_bodies_are_kept_as_strings() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rules/9/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let err = store(&mock_server).delete_rule(&"9".into()).await.unwrap_err();
        assert_eq!(err.payload(), json!("Internal Server Error"));
    }

    #[test]
    fn endpoint_encodes_ids_and_keeps_base_path() {
        let config = StoreConfig::new("http://localhost:8000/api/").unwrap();
        let store = HttpRuleStore::new(&config).unwrap();
        let url = store.endpoint("rules", Some(&"a b".into())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/rules/a%20b/");
        let url = store.endpoint("webhook", Some(&"4".into())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/webhook/4/");
    }
}
