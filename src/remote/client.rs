//! HTTP implementation of the remote endpoint and connectivity probe.

use std::time::Duration;

use reqwest::blocking::Client;

use super::endpoint::{classify_status, Ack, RemoteEndpoint, RemoteFailure, SyncRequest};
use crate::config::RemoteConfig;
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::features::sync::{ConnectivitySignal, Mutation};

/// Header carrying the entry id on every submission.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Submits mutations to `POST {base_url}{sync_path}`.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: Client,
    url: String,
    auth_token: Option<String>,
}

impl HttpEndpoint {
    /// Create an endpoint posting to `url`, giving up on each request after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `Remote` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BoardsyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardsyncError::Remote(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            auth_token: None,
        })
    }

    /// Create an endpoint from the `remote` config section.
    ///
    /// # Errors
    ///
    /// Returns `Remote` if the HTTP client cannot be built.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, BoardsyncError> {
        Ok(Self::new(config.sync_url(), config.request_timeout())?
            .with_auth_token(config.auth_token.clone()))
    }

    /// Send `Authorization: Bearer <token>` with every submission.
    #[must_use]
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RemoteEndpoint for HttpEndpoint {
    fn submit(&self, id: &EntryId, payload: &Mutation) -> Result<Ack, RemoteFailure> {
        let mut request = self
            .client
            .post(&self.url)
            .header(IDEMPOTENCY_HEADER, id.as_str())
            .json(&SyncRequest { id, payload });

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| RemoteFailure::Transient(describe_transport_error(&e)))?;

        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();

        classify_status(status, &body)
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("could not connect: {err}")
    } else {
        format!("request failed: {err}")
    }
}

/// Reports online when the health URL answers with any HTTP response.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    /// # Errors
    ///
    /// Returns `Remote` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BoardsyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BoardsyncError::Remote(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a probe from the `remote` config section.
    ///
    /// # Errors
    ///
    /// Returns `Remote` if the HTTP client cannot be built.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, BoardsyncError> {
        Self::new(config.health_url(), config.probe_timeout())
    }
}

impl ConnectivitySignal for HttpProbe {
    fn is_online(&self) -> bool {
        match self.client.get(&self.url).send() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "connectivity probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sync::{CreateProject, Mutation};
    use mockito::Matcher;

    fn project() -> Mutation {
        Mutation::CreateProject(CreateProject {
            workspace_id: 1,
            name: "Launch".to_string(),
            description: None,
            is_personal: false,
        })
    }

    fn endpoint(server: &mockito::Server) -> HttpEndpoint {
        HttpEndpoint::new(format!("{}/api/sync", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_submit_acknowledged() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/sync")
            .match_header(IDEMPOTENCY_HEADER, "x1")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "id": "x1",
                "payload": {"kind": "create_project", "name": "Launch"}
            })))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create();

        let id = EntryId::parse("x1").unwrap();
        let ack = endpoint(&server).submit(&id, &project()).unwrap();

        assert_eq!(ack.status, 200);
        mock.assert();
    }

    #[test]
    fn test_submit_sends_bearer_token() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/sync")
            .match_header("authorization", "Bearer s3cret")
            .with_status(201)
            .create();

        let endpoint = endpoint(&server).with_auth_token(Some("s3cret".to_string()));
        assert!(endpoint.submit(&EntryId::generate(), &project()).is_ok());
        mock.assert();
    }

    #[test]
    fn test_submit_rejected_is_permanent() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/sync")
            .with_status(422)
            .with_body("title required")
            .create();

        let err = endpoint(&server)
            .submit(&EntryId::generate(), &project())
            .unwrap_err();

        assert_eq!(
            err,
            RemoteFailure::Permanent {
                status: Some(422),
                reason: "title required".to_string(),
            }
        );
    }

    #[test]
    fn test_submit_server_error_is_transient() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/api/sync").with_status(503).create();

        let err = endpoint(&server)
            .submit(&EntryId::generate(), &project())
            .unwrap_err();

        assert!(err.is_transient());
    }

    #[test]
    fn test_unreachable_host_is_transient() {
        // Port 9 (discard) on localhost is closed on test machines.
        let endpoint =
            HttpEndpoint::new("http://127.0.0.1:9/api/sync", Duration::from_secs(2)).unwrap();

        let err = endpoint
            .submit(&EntryId::generate(), &project())
            .unwrap_err();

        assert!(err.is_transient());
    }

    #[test]
    fn test_probe() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/api/health").with_status(503).create();

        let probe =
            HttpProbe::new(format!("{}/api/health", server.url()), Duration::from_secs(2)).unwrap();
        assert!(probe.is_online());

        let probe = HttpProbe::new("http://127.0.0.1:9/api/health", Duration::from_secs(2)).unwrap();
        assert!(!probe.is_online());
    }

    #[test]
    fn test_from_config_joins_paths() {
        let config = RemoteConfig {
            base_url: "http://example.test/".to_string(),
            ..RemoteConfig::default()
        };

        let endpoint = HttpEndpoint::from_config(&config).unwrap();
        assert_eq!(endpoint.url(), "http://example.test/api/sync");
    }
}
