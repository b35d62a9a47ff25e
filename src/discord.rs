use std::{fmt, thread::sleep, time::Duration};

use color_eyre::{eyre::WrapErr, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use ureq::{Agent, AgentBuilder, Response};

pub const WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Patch,
    Get,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Get => "GET",
            Method::Delete => "DELETE",
        }
    }

    fn carries_body(self) -> bool {
        matches!(self, Method::Post | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body of an execute or edit request. Only the fields the user
/// supplied are serialized.
#[derive(Serialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts: Option<bool>,
}

/// Outcome of [`Dispatcher::validate`]. Only `Valid` lets a command proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    /// The URL does not start with the webhook API prefix.
    BadPrefix,
    /// Discord answered the probe with 401.
    Unauthorized,
}

pub struct Dispatcher {
    agent: Agent,
    prefix: String,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_prefix(WEBHOOK_PREFIX)
    }

    /// Accept webhook URLs under `prefix` instead of the Discord API.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            agent: AgentBuilder::new().build(),
            prefix: prefix.into(),
        }
    }

    /// Checks the URL prefix, then probes the URL with a GET. Only a 401
    /// answer marks the webhook invalid; other statuses and transport
    /// failures pass.
    pub fn validate(&self, url: &str) -> Validation {
        if !url.starts_with(&self.prefix) {
            return Validation::BadPrefix;
        }
        match self.agent.get(url).call() {
            Ok(response) => {
                cool_ratelimit(&response);
                Validation::Valid
            }
            Err(ureq::Error::Status(401, _)) => Validation::Unauthorized,
            Err(ureq::Error::Status(code, response)) => {
                debug!(code, "probe returned an error status, accepting webhook");
                cool_ratelimit(&response);
                Validation::Valid
            }
            Err(err) => {
                debug!(%err, "probe failed, accepting webhook");
                Validation::Valid
            }
        }
    }

    /// Sends `payload` as JSON. Methods without a body are not sent and
    /// yield `None`.
    pub fn dispatch<T: Serialize>(
        &self,
        method: Method,
        url: &str,
        payload: &T,
    ) -> Result<Option<Response>> {
        if !method.carries_body() {
            debug!(%method, "method carries no payload, nothing dispatched");
            return Ok(None);
        }
        let body = serde_json::to_string(payload)?;
        debug!(%method, %body, "dispatching webhook request");
        let response = self
            .agent
            .request(method.as_str(), url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .wrap_err_with(|| format!("{method} request to the webhook failed"))?;
        cool_ratelimit(&response);
        Ok(Some(response))
    }

    pub fn fetch(&self, url: &str) -> Result<Value> {
        debug!(method = %Method::Get, "fetching webhook message");
        let response = self
            .agent
            .get(url)
            .call()
            .wrap_err("Failed to fetch the webhook message")?;
        cool_ratelimit(&response);
        Ok(serde_json::from_reader(response.into_reader())?)
    }

    pub fn remove(&self, url: &str) -> Result<()> {
        debug!(method = %Method::Delete, "deleting webhook message");
        let response = self
            .agent
            .delete(url)
            .call()
            .wrap_err("Failed to delete the webhook message")?;
        cool_ratelimit(&response);
        Ok(())
    }
}

fn cool_ratelimit(resp: &Response) {
    let remaining = resp
        .header("X-RateLimit-Remaining")
        .and_then(|h| h.parse::<u64>().ok());
    if remaining != Some(0) {
        return;
    }
    let reset_after = resp
        .header("X-RateLimit-Reset-After")
        .and_then(|h| h.parse::<f64>().ok());
    if let Some(secs) = reset_after.filter(|s| s.is_finite() && *s > 0.0) {
        warn!(secs, "rate limit exhausted, waiting for reset");
        sleep(Duration::from_secs_f64(secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{any, body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const HOOK_PATH: &str = "/api/webhooks/1234/token";

    fn local(server: &MockServer) -> (Dispatcher, String) {
        let dispatcher = Dispatcher::with_prefix(format!("{}/api/webhooks/", server.uri()));
        (dispatcher, format!("{}{HOOK_PATH}", server.uri()))
    }

    #[test]
    fn rejects_foreign_prefix_without_probing() {
        let dispatcher = Dispatcher::new();
        for url in [
            "https://example.com/api/webhooks/1/abc",
            "https://discord.com/api/webhook/1/abc",
            "http://discord.com/api/webhooks/1/abc",
            "",
        ] {
            assert_eq!(dispatcher.validate(url), Validation::BadPrefix, "{url}");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unauthorized_probe_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HOOK_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        assert_eq!(dispatcher.validate(&url), Validation::Unauthorized);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn other_error_statuses_pass() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HOOK_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        assert_eq!(dispatcher.validate(&url), Validation::Valid);
    }

    #[test]
    fn unreachable_host_fails_open() {
        let dispatcher = Dispatcher::with_prefix("http://127.0.0.1:1/api/webhooks/");
        assert_eq!(
            dispatcher.validate("http://127.0.0.1:1/api/webhooks/1/abc"),
            Validation::Valid
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn post_sends_only_supplied_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(HOOK_PATH))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"content": "hello", "username": "bob"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        let payload = MessagePayload {
            content: Some("hello".into()),
            username: Some("bob".into()),
            ..Default::default()
        };
        let response = dispatcher.dispatch(Method::Post, &url, &payload).unwrap();
        assert_eq!(response.map(|r| r.status()), Some(204));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn bodiless_methods_are_not_dispatched() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        let payload = MessagePayload::default();
        assert!(dispatcher.dispatch(Method::Delete, &url, &payload).unwrap().is_none());
        assert!(dispatcher.dispatch(Method::Get, &url, &payload).unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn dispatch_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        let payload = MessagePayload {
            content: Some("edited".into()),
            ..Default::default()
        };
        assert!(dispatcher.dispatch(Method::Patch, &url, &payload).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn waits_out_exhausted_ratelimit() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(
                ResponseTemplate::new(204)
                    .insert_header("X-RateLimit-Remaining", "0")
                    .insert_header("X-RateLimit-Reset-After", "0.05"),
            )
            .expect(1)
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        let started = std::time::Instant::now();
        dispatcher.remove(&url).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "42"})))
            .mount(&server)
            .await;
        let (dispatcher, url) = local(&server);

        assert_eq!(dispatcher.fetch(&url).unwrap(), json!({"id": "42"}));
    }

    #[test]
    fn tts_is_a_json_boolean() {
        let payload = MessagePayload {
            content: Some("hi".into()),
            tts: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"content":"hi","tts":true}"#
        );
    }
}
