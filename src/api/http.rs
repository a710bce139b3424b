use super::{
    ApiError, Approval, ApproveRequest, Backend, ErrorBody, GenerateDraftRequest, GeneratedDraft,
    RefineDraftRequest, RefinedDraft,
};
use crate::config::BackendConfig;
use crate::session::{Entry, LogEntry};
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// [`Backend`] over JSON/HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        // Url::join drops the last path segment unless the base ends in '/'
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| ApiError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self.client.post(url).json(body).send().await?;
        read_json(response).await
    }
}

/// Decodes a 2xx body as `T`; anything else becomes the backend's `error`
/// message, or `HTTP <status>` when it did not send one.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let url = response.url().clone();
    let bytes = response.bytes().await?;
    debug!("<- {} {}", url.path(), status);

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.trim().is_empty());
    warn!("{} answered {}: {:?}", url.path(), status, message);
    Err(match message {
        Some(message) => ApiError::Backend(message),
        None => ApiError::Status(status.as_u16()),
    })
}

impl Backend for HttpBackend {
    async fn list_entries(&self) -> Result<Vec<Entry>, ApiError> {
        self.get_json("entries").await
    }

    async fn draft_email(&self, request: &GenerateDraftRequest) -> Result<GeneratedDraft, ApiError> {
        self.post_json("draft_email", request).await
    }

    async fn refine_draft(&self, request: &RefineDraftRequest) -> Result<RefinedDraft, ApiError> {
        self.post_json("refine_draft", request).await
    }

    async fn approve_email(&self, request: &ApproveRequest) -> Result<Approval, ApiError> {
        self.post_json("approve_email", request).await
    }

    async fn list_logs(&self) -> Result<Vec<LogEntry>, ApiError> {
        self.get_json("logs").await
    }
}
