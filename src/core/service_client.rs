// src/core/service_client.rs
//! HTTP client for the candidate CV endpoints of the job marketplace backend

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::ApiError;
use crate::types::{
    ApiErrorBody, CvStatusResponse, CvSummary, JobId, JobStatusResponse, UploadResponse,
};
use crate::upload::LocalFileSelection;

const UPLOAD_ENDPOINT: &str = "/candidate/cv/upload";
const JOB_STATUS_ENDPOINT: &str = "/candidate/cv/job-status";
const MY_CV_ENDPOINT: &str = "/candidate/cv/my-cv";
const CV_STATUS_ENDPOINT: &str = "/candidate/cv/status";
const CV_ENDPOINT: &str = "/candidate/cv";
const DOWNLOAD_ENDPOINT: &str = "/candidate/cv/download";

const UPLOAD_FIELD: &str = "file";

/// Operations the upload flow needs from the backend.
#[async_trait]
pub trait CvApi: Send + Sync {
    async fn upload_cv(&self, file: &LocalFileSelection) -> Result<UploadResponse, ApiError>;
    async fn job_status(&self, job_id: JobId) -> Result<JobStatusResponse, ApiError>;
    async fn my_cv(&self) -> Result<CvSummary, ApiError>;
    async fn cv_status(&self) -> Result<CvStatusResponse, ApiError>;
    async fn delete_cv(&self) -> Result<(), ApiError>;
    async fn download_cv(&self) -> Result<Vec<u8>, ApiError>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ServiceClient {
    pub fn new(base_url: &str, timeout_seconds: u64, token: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(token),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.token.read().ok().and_then(|t| t.clone());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map non-2xx responses to `ApiError`, dropping the session on 401/403
    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("Backend rejected session ({}), clearing token", status);
            self.set_token(None);
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()));

        warn!("CV service error response {}: {:?}", status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<R>(&self, endpoint: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = self.check(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl CvApi for ServiceClient {
    async fn upload_cv(&self, file: &LocalFileSelection) -> Result<UploadResponse, ApiError> {
        let url = self.url(UPLOAD_ENDPOINT);
        let content = tokio::fs::read(&file.path).await?;

        let form = Form::new().part(
            UPLOAD_FIELD,
            Part::bytes(content)
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)?,
        );

        info!("Uploading {} ({} bytes) to {}", file.name, file.size, url);

        let response = self
            .authorized(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;
        let response = self.check(response).await?;

        let text = response.text().await?;
        debug!("Raw upload response: {}", text);
        Ok(serde_json::from_str(&text)?)
    }

    async fn job_status(&self, job_id: JobId) -> Result<JobStatusResponse, ApiError> {
        self.get_json(&format!("{}/{}", JOB_STATUS_ENDPOINT, job_id))
            .await
    }

    async fn my_cv(&self) -> Result<CvSummary, ApiError> {
        self.get_json(MY_CV_ENDPOINT).await
    }

    async fn cv_status(&self) -> Result<CvStatusResponse, ApiError> {
        self.get_json(CV_STATUS_ENDPOINT).await
    }

    async fn delete_cv(&self) -> Result<(), ApiError> {
        let url = self.url(CV_ENDPOINT);
        info!("DELETE {}", url);

        let response = self.authorized(self.client.delete(&url)).send().await?;
        self.check(response).await?;
        Ok(())
    }

    async fn download_cv(&self) -> Result<Vec<u8>, ApiError> {
        let url = self.url(DOWNLOAD_ENDPOINT);
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = self.check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
