//! Transmission RPC client.
//!
//! Every call is a JSON `POST` of `{"method", "arguments"}` to the RPC
//! endpoint. Transmission guards the endpoint with a CSRF token: the first
//! request is answered with HTTP 409 and an `X-Transmission-Session-Id`
//! header, which must be echoed on every later request. The client stores
//! the token and replays the rejected request once.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, trace};
use url::Url;

use crate::error::{DaemonError, Result};
use crate::types::{AddedTorrent, TorrentId, TorrentRecord};

/// CSRF header used by Transmission.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Operations the bot needs from the torrent daemon.
///
/// Implementations never retry; callers decide what a failure means.
#[async_trait]
pub trait DaemonClient: Send + Sync {
    /// All torrents, in the daemon's order.
    async fn list(&self) -> Result<Vec<TorrentRecord>>;

    /// Pause a torrent.
    async fn stop(&self, id: TorrentId) -> Result<()>;

    /// Resume a torrent.
    async fn start(&self, id: TorrentId) -> Result<()>;

    /// Add a torrent from a magnet link or URL.
    async fn add_by_uri(&self, uri: &str) -> Result<AddedTorrent>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: String,
    arguments: Option<R>,
}

#[derive(Debug, Deserialize)]
struct TorrentGetArguments {
    torrents: Vec<TorrentRecord>,
}

#[derive(Debug, Deserialize)]
struct TorrentAddArguments {
    #[serde(rename = "torrent-added")]
    added: Option<AddedTorrent>,
    #[serde(rename = "torrent-duplicate")]
    duplicate: Option<AddedTorrent>,
}

/// Basic-auth credentials for the RPC endpoint.
#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: Option<String>,
}

/// Client for a Transmission daemon.
pub struct TransmissionClient {
    client: reqwest::Client,
    url: Url,
    credentials: Option<Credentials>,
    session_id: RwLock<Option<String>>,
}

impl TransmissionClient {
    /// Create a client for the given RPC endpoint.
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            credentials: None,
            session_id: RwLock::new(None),
        }
    }

    /// Authenticate every request with HTTP basic auth.
    pub fn with_credentials(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password,
        });
        self
    }

    /// The RPC endpoint in use.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn send(&self, request: &RpcRequest<'_>) -> Result<reqwest::Response> {
        let mut builder = self.client.post(self.url.clone()).json(request);

        if let Some(id) = self.session_id.read().await.as_deref() {
            builder = builder.header(SESSION_ID_HEADER, id);
        }
        if let Some(creds) = &self.credentials {
            builder = builder.basic_auth(&creds.username, creds.password.as_deref());
        }

        Ok(builder.send().await?)
    }

    /// Perform one RPC call and decode its `arguments`.
    async fn call<R>(&self, method: &str, arguments: Value) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = RpcRequest { method, arguments };
        trace!(method, "Sending RPC request");

        let mut response = self.send(&request).await?;

        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(DaemonError::MissingSessionId)?
                .to_string();
            debug!("Transmission session id refreshed");
            *self.session_id.write().await = Some(session_id);
            response = self.send(&request).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DaemonError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: RpcResponse<R> = response
            .json()
            .await
            .map_err(|e| DaemonError::Decode(e.to_string()))?;

        if body.result != "success" {
            return Err(DaemonError::Rpc(body.result));
        }

        body.arguments
            .ok_or_else(|| DaemonError::Decode(format!("{} response has no arguments", method)))
    }

    async fn call_on_torrent(&self, method: &str, id: TorrentId) -> Result<()> {
        if id <= 0 {
            return Err(DaemonError::InvalidId(id));
        }
        let _: IgnoredAny = self.call(method, json!({ "ids": [id] })).await?;
        Ok(())
    }
}

#[async_trait]
impl DaemonClient for TransmissionClient {
    async fn list(&self) -> Result<Vec<TorrentRecord>> {
        let args: TorrentGetArguments = self
            .call("torrent-get", json!({ "fields": TorrentRecord::FIELDS }))
            .await?;
        debug!(count = args.torrents.len(), "Fetched torrents");
        Ok(args.torrents)
    }

    async fn stop(&self, id: TorrentId) -> Result<()> {
        self.call_on_torrent("torrent-stop", id).await
    }

    async fn start(&self, id: TorrentId) -> Result<()> {
        self.call_on_torrent("torrent-start", id).await
    }

    async fn add_by_uri(&self, uri: &str) -> Result<AddedTorrent> {
        let args: TorrentAddArguments = self
            .call("torrent-add", json!({ "filename": uri }))
            .await?;
        args.added
            .or(args.duplicate)
            .ok_or_else(|| DaemonError::Decode("torrent-add response has no torrent".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TorrentStatus;
    use httpmock::prelude::*;

    const RPC_PATH: &str = "/transmission/rpc";

    fn client_for(server: &MockServer) -> TransmissionClient {
        let url = Url::parse(&server.url(RPC_PATH)).unwrap();
        TransmissionClient::new(url)
    }

    #[tokio::test]
    async fn test_list_returns_torrents_in_order() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-get",
                "arguments": {"fields": ["id", "name", "percentDone", "status", "downloadDir", "files"]}
            }));
            then.status(200).json_body(json!({
                "result": "success",
                "arguments": {"torrents": [
                    {"id": 3, "name": "b", "percentDone": 0.5, "status": 4, "downloadDir": "/d", "files": []},
                    {"id": 1, "name": "a", "percentDone": 1.0, "status": 0, "downloadDir": "/d", "files": []}
                ]}
            }));
        });

        let torrents = client_for(&server).list().await.unwrap();

        mock.assert();
        assert_eq!(torrents.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(torrents[0].status, TorrentStatus::Downloading);
        assert!(torrents[1].is_finished());
    }

    #[tokio::test]
    async fn test_session_id_handshake() {
        let server = MockServer::start_async().await;
        let rejected = server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).header_missing(SESSION_ID_HEADER);
            then.status(409).header(SESSION_ID_HEADER, "token-1");
        });
        let accepted = server.mock(|when, then| {
            when.method(POST)
                .path(RPC_PATH)
                .header(SESSION_ID_HEADER, "token-1");
            then.status(200)
                .json_body(json!({"result": "success", "arguments": {}}));
        });

        let client = client_for(&server);
        client.stop(4).await.unwrap();
        client.start(4).await.unwrap();

        rejected.assert_hits(1);
        accepted.assert_hits(2);
    }

    #[tokio::test]
    async fn test_conflict_without_header() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(409);
        });

        let err = client_for(&server).list().await.unwrap_err();
        assert!(matches!(err, DaemonError::MissingSessionId));
    }

    #[tokio::test]
    async fn test_stop_sends_ids() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-stop",
                "arguments": {"ids": [12]}
            }));
            then.status(200)
                .json_body(json!({"result": "success", "arguments": {}}));
        });

        client_for(&server).stop(12).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected_locally() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(200)
                .json_body(json!({"result": "success", "arguments": {}}));
        });

        let err = client_for(&server).start(0).await.unwrap_err();
        assert!(matches!(err, DaemonError::InvalidId(0)));
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_rpc_failure_result() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(200)
                .json_body(json!({"result": "invalid or corrupt torrent file", "arguments": {}}));
        });

        let err = client_for(&server)
            .add_by_uri("magnet:?xt=urn:btih:bad")
            .await
            .unwrap_err();
        assert!(matches!(err, DaemonError::Rpc(msg) if msg.contains("corrupt")));
    }

    #[tokio::test]
    async fn test_add_returns_added_or_duplicate() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-add",
                "arguments": {"filename": "magnet:?xt=urn:btih:new"}
            }));
            then.status(200).json_body(json!({
                "result": "success",
                "arguments": {"torrent-added": {"id": 21, "name": "new", "hashString": "abc"}}
            }));
        });
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH).json_body(json!({
                "method": "torrent-add",
                "arguments": {"filename": "magnet:?xt=urn:btih:old"}
            }));
            then.status(200).json_body(json!({
                "result": "success",
                "arguments": {"torrent-duplicate": {"id": 5, "name": "old", "hashString": "def"}}
            }));
        });

        let client = client_for(&server);
        let added = client.add_by_uri("magnet:?xt=urn:btih:new").await.unwrap();
        assert_eq!((added.id, added.name.as_str()), (21, "new"));

        let duplicate = client.add_by_uri("magnet:?xt=urn:btih:old").await.unwrap();
        assert_eq!((duplicate.id, duplicate.name.as_str()), (5, "old"));
    }

    #[tokio::test]
    async fn test_basic_auth_header() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(RPC_PATH)
                .header("Authorization", "Basic cGk6cmFzcGJlcnJ5");
            then.status(200)
                .json_body(json!({"result": "success", "arguments": {}}));
        });

        let client = client_for(&server).with_credentials("pi", Some("raspberry".to_string()));
        client.stop(3).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_add_without_torrent_in_response() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(200)
                .json_body(json!({"result": "success", "arguments": {}}));
        });

        let err = client_for(&server)
            .add_by_uri("magnet:?xt=urn:btih:abc")
            .await
            .unwrap_err();
        assert!(matches!(err, DaemonError::Decode(_)));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(401).body("Unauthorized");
        });

        let err = client_for(&server).list().await.unwrap_err();
        assert!(matches!(err, DaemonError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(RPC_PATH);
            then.status(200).body("not json");
        });

        let err = client_for(&server).list().await.unwrap_err();
        assert!(matches!(err, DaemonError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_daemon() {
        let client = TransmissionClient::new(Url::parse("http://127.0.0.1:1/transmission/rpc").unwrap());
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, DaemonError::Http(_)));
    }
}
