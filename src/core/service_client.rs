// src/core/service_client.rs
//! HTTP client for the resume collaborator (parsing, template binding, summaries)

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{error, info, trace};
use uuid::Uuid;

use crate::error::BackendError;
use crate::types::response::{
    ChangeTemplateRequest, ChangeTemplateResponse, ErrorDetail, GenerateSummaryRequest,
    GenerateSummaryResponse, HealthResponse, ParsedResumeResponse, ResumePayload,
};
use crate::types::ResumeDocument;
use crate::utils::{content_type_for, SourceFile};

const UPLOAD_RESUME_ENDPOINT: &str = "/upload-resume";
const CHANGE_TEMPLATE_ENDPOINT: &str = "/change-template";
const GENERATE_SUMMARY_ENDPOINT: &str = "/generate-summary";
const RESUME_ENDPOINT: &str = "/resume";
const HEALTH_ENDPOINT: &str = "/health";

/// The collaborator as seen by the store.
#[async_trait]
pub trait ResumeBackend: Send + Sync {
    async fn upload_resume(
        &self,
        file: &SourceFile,
        template_id: &str,
    ) -> Result<ParsedResumeResponse, BackendError>;

    async fn change_template(
        &self,
        resume_id: Uuid,
        template_id: &str,
    ) -> Result<ChangeTemplateResponse, BackendError>;

    async fn generate_summary(
        &self,
        job_description: &str,
        resume: &ResumeDocument,
    ) -> Result<GenerateSummaryResponse, BackendError>;

    async fn fetch_resume(&self, resume_id: Uuid) -> Result<ParsedResumeResponse, BackendError>;
}

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create new service client with configuration
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn health(&self) -> Result<HealthResponse, BackendError> {
        let url = self.url(HEALTH_ENDPOINT);
        trace!("Probing resume service: {}", url);
        let response = self.client.get(&url).send().await.map_err(transport)?;
        read_json(response).await
    }
}

#[async_trait]
impl ResumeBackend for ServiceClient {
    async fn upload_resume(
        &self,
        file: &SourceFile,
        template_id: &str,
    ) -> Result<ParsedResumeResponse, BackendError> {
        let url = self.url(UPLOAD_RESUME_ENDPOINT);

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(content_type_for(&file.file_name))
            .map_err(|e| BackendError::Transport(format!("Failed to create multipart: {}", e)))?;
        let form = Form::new()
            .part("file", part)
            .text("template_id", template_id.to_string());

        info!(
            "Uploading {} ({} bytes) to resume service: {}",
            file.file_name,
            file.size(),
            url
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        read_json(response).await
    }

    async fn change_template(
        &self,
        resume_id: Uuid,
        template_id: &str,
    ) -> Result<ChangeTemplateResponse, BackendError> {
        let url = self.url(CHANGE_TEMPLATE_ENDPOINT);
        let payload = ChangeTemplateRequest {
            resume_id,
            template_id,
        };

        info!("Re-binding resume {} to template {}", resume_id, template_id);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;

        read_json(response).await
    }

    async fn generate_summary(
        &self,
        job_description: &str,
        resume: &ResumeDocument,
    ) -> Result<GenerateSummaryResponse, BackendError> {
        let url = self.url(GENERATE_SUMMARY_ENDPOINT);
        let payload = GenerateSummaryRequest {
            job_description,
            resume_data: ResumePayload::from(resume),
        };

        info!(
            "Requesting summary ({} chars of job description): {}",
            job_description.chars().count(),
            url
        );

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(transport)?;

        read_json(response).await
    }

    async fn fetch_resume(&self, resume_id: Uuid) -> Result<ParsedResumeResponse, BackendError> {
        let url = format!("{}/{}", self.url(RESUME_ENDPOINT), resume_id);

        info!("Fetching parsed resume: {}", url);

        let response = self.client.get(&url).send().await.map_err(transport)?;
        read_json(response).await
    }
}

fn transport(err: reqwest::Error) -> BackendError {
    error!("Resume service request failed: {}", err);
    BackendError::Transport(err.to_string())
}

async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, BackendError> {
    let status = response.status();
    trace!("Response status: {}", status);

    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(format!("Failed to read response body: {}", e)))?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(|e| {
            error!("Undecodable resume service response: {}", e);
            BackendError::Decode(e.to_string())
        });
    }

    error!("Resume service error response {}: {}", status, body);
    Err(classify_failure(status.as_u16(), &body))
}

/// A 4xx with a readable `detail` is a rejection of the input; anything else
/// is a service failure.
pub fn classify_failure(status: u16, body: &str) -> BackendError {
    let detail = serde_json::from_str::<ErrorDetail>(body)
        .ok()
        .and_then(|err| match err.detail {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

    match detail {
        Some(detail) if (400..500).contains(&status) => BackendError::Rejected { status, detail },
        Some(detail) => BackendError::Status {
            status,
            body: detail,
        },
        None => BackendError::Status {
            status,
            body: body.to_string(),
        },
    }
}
