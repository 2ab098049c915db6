//! Request/response contract with the table server.

use std::future::Future;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::game::{ActionRequest, ErrorBody, GameStateSnapshot, GameSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    StartGame,
    Action,
    NextRound,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::StartGame => "start_game",
            Endpoint::Action => "action",
            Endpoint::NextRound => "next_round",
        }
    }
}

/// A successful server reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    State(Box<GameStateSnapshot>),
    Finished(GameSummary),
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with `{"error": ..}`.
    #[error("{0}")]
    Server(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable response (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid server url {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Rejected(ErrorBody),
    Finished(GameSummary),
    State(Box<GameStateSnapshot>),
}

impl Reply {
    /// Interprets a response body. Error bodies are honoured whatever the status code.
    pub fn decode(status: u16, body: &[u8]) -> Result<Reply, ClientError> {
        match serde_json::from_slice::<Envelope>(body) {
            Ok(Envelope::Rejected(rejected)) => Err(ClientError::Server(rejected.error)),
            Ok(Envelope::Finished(summary)) => Ok(Reply::Finished(summary)),
            Ok(Envelope::State(snapshot)) => Ok(Reply::State(snapshot)),
            Err(source) => Err(ClientError::Decode { status, source }),
        }
    }
}

/// Anything able to carry one request to the table server and bring back its reply.
pub trait GameServer {
    fn exchange(
        &self,
        endpoint: Endpoint,
        body: Option<&ActionRequest>,
    ) -> impl Future<Output = Result<Reply, ClientError>>;
}

#[derive(Debug, Clone)]
pub struct HttpGameServer {
    http: Client,
    base: Url,
}

impl HttpGameServer {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|err| ClientError::InvalidUrl(format!("'{base_url}': {err}")))?;
        let http = Client::builder().build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

impl GameServer for HttpGameServer {
    async fn exchange(
        &self,
        endpoint: Endpoint,
        body: Option<&ActionRequest>,
    ) -> Result<Reply, ClientError> {
        let url = self
            .base
            .join(endpoint.path())
            .map_err(|err| ClientError::InvalidUrl(format!("'{}': {err}", endpoint.path())))?;
        debug!(%url, ?body, "sending request");

        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), len = bytes.len(), "received reply");

        Reply::decode(status.as_u16(), &bytes)
    }
}
