use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{RevisionBody, SearchReply, StatusReply};
use crate::{
    ActionReply, ActionRequest, ApiError, ContentKind, ContentVersion, FailureKind,
    ScreenshotBytes, SearchRequest, StoreOverview, StoredVersionHit,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_image_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

/// The chapter review backend.
#[async_trait::async_trait]
pub trait ReviewApi: Send + Sync {
    async fn fetch_content(
        &self,
        chapter_id: &str,
        kind: ContentKind,
    ) -> Result<ContentVersion, ApiError>;

    async fn fetch_screenshot(&self) -> Result<ScreenshotBytes, ApiError>;

    /// `Ok(None)` when the reply has no `latest_status` field.
    async fn fetch_status(&self, chapter_id: &str) -> Result<Option<String>, ApiError>;

    async fn submit_action(
        &self,
        chapter_id: &str,
        action: &ActionRequest,
    ) -> Result<ActionReply, ApiError>;

    async fn semantic_search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<StoredVersionHit>, ApiError>;

    async fn store_overview(&self) -> Result<StoreOverview, ApiError>;

    async fn health(&self) -> Result<String, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestReviewApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestReviewApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::new(
                    FailureKind::InvalidUrl,
                    format!("{} cannot be a base url", self.settings.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string();
        let body = response.bytes().await.unwrap_or_default();
        let server_message = server_message(&body);
        review_logging::review_debug!(
            "backend replied {} ({})",
            status.as_u16(),
            server_message.as_deref().unwrap_or(&fallback)
        );
        Err(ApiError {
            kind: FailureKind::HttpStatus(status.as_u16()),
            message: fallback,
            server_message,
        })
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> ApiError {
        ApiError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_image_bytes,
                actual: Some(actual),
            },
            "screenshot too large",
        )
    }
}

#[async_trait::async_trait]
impl ReviewApi for ReqwestReviewApi {
    async fn fetch_content(
        &self,
        chapter_id: &str,
        kind: ContentKind,
    ) -> Result<ContentVersion, ApiError> {
        let url = self.endpoint(&["content", chapter_id, kind.path_segment()])?;
        self.read_json(self.client.get(url)).await
    }

    async fn fetch_screenshot(&self) -> Result<ScreenshotBytes, ApiError> {
        let url = self.endpoint(&["screenshot"])?;
        let response = self.send(self.client.get(url)).await?;

        if let Some(len) = response.content_length() {
            if len > self.settings.max_image_bytes {
                return Err(self.too_large(len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_image_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(ScreenshotBytes {
            bytes,
            content_type,
        })
    }

    async fn fetch_status(&self, chapter_id: &str) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["chromadb_status_chapter", chapter_id])?;
        let reply: StatusReply = self.read_json(self.client.get(url)).await?;
        Ok(reply.latest_status)
    }

    async fn submit_action(
        &self,
        chapter_id: &str,
        action: &ActionRequest,
    ) -> Result<ActionReply, ApiError> {
        let url = self.endpoint(&[action.endpoint().path_segment(), chapter_id])?;
        let request = match action {
            ActionRequest::Approve => self.client.post(url),
            ActionRequest::RequestRevision { feedback } => {
                let body = serde_json::to_vec(&RevisionBody { feedback })
                    .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
            }
        };
        self.read_json(request).await
    }

    async fn semantic_search(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<StoredVersionHit>, ApiError> {
        let url = self.endpoint(&["semantic_search"])?;
        let body = serde_json::to_vec(request)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let reply: SearchReply = self
            .read_json(
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body),
            )
            .await?;
        Ok(reply.results)
    }

    async fn store_overview(&self) -> Result<StoreOverview, ApiError> {
        let url = self.endpoint(&["chromadb_status"])?;
        self.read_json(self.client.get(url)).await
    }

    async fn health(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&[])?;
        let response = self.send(self.client.get(url)).await?;
        response.text().await.map_err(map_reqwest_error)
    }
}

/// Pulls `message` or `error` out of a JSON error body.
fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_message_then_error() {
        assert_eq!(
            server_message(br#"{"message":"m","error":"e"}"#).as_deref(),
            Some("m")
        );
        assert_eq!(server_message(br#"{"error":"e"}"#).as_deref(), Some("e"));
        assert_eq!(server_message(b"<html>oops</html>"), None);
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let api = ReqwestReviewApi::new(ApiSettings {
            base_url: "http://host:5000/api/".to_string(),
            ..ApiSettings::default()
        })
        .unwrap();
        let url = api.endpoint(&["content", "ch 1", "spun"]).unwrap();
        assert_eq!(url.as_str(), "http://host:5000/api/content/ch%201/spun");
    }
}
