use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::protocol::{
    LoginForm, LoginResponse, MessageResponse, RegisterForm, StoryListResponse,
};
use tracing::debug;
use url::Url;

use crate::error::ApiError;

/// Typed surface of the story service.
///
/// Every call resolves exactly once, either with the decoded 2xx body or
/// with an [`ApiError`]. Nothing is retried.
#[async_trait]
pub trait StoryApi: Send + Sync {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    async fn list_stories(
        &self,
        token: &str,
        page_size: u32,
    ) -> Result<StoryListResponse, ApiError>;

    async fn create_story(
        &self,
        token: &str,
        image_bytes: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<MessageResponse, ApiError>;
}

pub struct HttpStoryApi {
    http: Client,
    base_url: Url,
}

impl HttpStoryApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "api: non-success response");
    Err(ApiError::server(status, body))
}

#[async_trait]
impl StoryApi for HttpStoryApi {
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<MessageResponse, ApiError> {
        let response = self
            .http
            .post(self.endpoint("register")?)
            .form(&RegisterForm {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .http
            .post(self.endpoint("login")?)
            .form(&LoginForm {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn list_stories(
        &self,
        token: &str,
        page_size: u32,
    ) -> Result<StoryListResponse, ApiError> {
        let response = self
            .http
            .get(self.endpoint("stories")?)
            .bearer_auth(token)
            .query(&[("size", page_size)])
            .send()
            .await?;
        decode(response).await
    }

    async fn create_story(
        &self,
        token: &str,
        image_bytes: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<MessageResponse, ApiError> {
        let photo = Part::bytes(image_bytes)
            .file_name(filename.to_string())
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .part("photo", photo)
            .text("description", caption.to_string());

        let response = self
            .http
            .post(self.endpoint("stories")?)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
