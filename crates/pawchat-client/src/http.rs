//! [`ChatApi`] over the backend's REST endpoints.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pawchat_shared::{DialogSummary, Handle, HistoryPage, Message, MessageId, PeerId};

use crate::api::ChatApi;
use crate::config::ClientConfig;
use crate::error::{ChatError, Result, TransportError};

/// The identity lookup answers with either a bare number or `{ "id": n }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdResponse {
    Bare(u64),
    Wrapped { id: u64 },
}

impl IdResponse {
    fn id(&self) -> u64 {
        match self {
            IdResponse::Bare(id) | IdResponse::Wrapped { id } => *id,
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    text: &'a str,
}

/// reqwest-backed chat client. Cheap to clone.
#[derive(Clone)]
pub struct HttpChatApi {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpChatApi {
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, TransportError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.session_token.clone(),
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> std::result::Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> std::result::Result<Response, TransportError> {
        let res = builder.send().await?;
        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Backend returned an error status");
            Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> std::result::Result<T, TransportError> {
        Ok(self.execute(builder).await?.json::<T>().await?)
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn resolve_handle(&self, handle: &Handle) -> Result<PeerId> {
        let url = self.endpoint(&["api", "public", "users", "username", handle.as_str(), "id"])?;
        let res = self.request(Method::GET, url).send().await.map_err(TransportError::from)?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(ChatError::NotFound(handle.as_str().to_string()));
        }
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(TransportError::UnexpectedStatus { status, body }.into());
        }

        let id: IdResponse = res.json().await.map_err(TransportError::from)?;
        Ok(PeerId(id.id()))
    }

    async fn fetch_history(&self, peer: PeerId, page: u32, size: u32) -> Result<HistoryPage> {
        let url = self.endpoint(&["api", "chat", &peer.to_string(), "messages"])?;
        let builder = self
            .request(Method::GET, url)
            .query(&[("page", page), ("size", size)]);
        Ok(self.get_json(builder).await?)
    }

    async fn fetch_after(&self, peer: PeerId, cursor: MessageId) -> Result<Vec<Message>> {
        let url = self.endpoint(&["api", "chat", &peer.to_string(), "new"])?;
        let builder = self
            .request(Method::GET, url)
            .query(&[("afterId", cursor.0)]);
        Ok(self.get_json(builder).await?)
    }

    async fn send_message(&self, peer: PeerId, text: &str) -> Result<Message> {
        let url = self.endpoint(&["api", "chat", &peer.to_string(), "messages"])?;
        let builder = self
            .request(Method::POST, url)
            .json(&SendMessageRequest { text });
        Ok(self.get_json(builder).await?)
    }

    async fn mark_read(&self, peer: PeerId) -> Result<()> {
        let url = self.endpoint(&["api", "chat", &peer.to_string(), "read"])?;
        self.execute(self.request(Method::PATCH, url)).await?;
        Ok(())
    }

    async fn list_dialogs(&self) -> Result<Vec<DialogSummary>> {
        let url = self.endpoint(&["api", "chat", "dialogs"])?;
        Ok(self.get_json(self.request(Method::GET, url)).await?)
    }
}
