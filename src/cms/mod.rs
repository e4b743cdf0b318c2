pub mod dto;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const CMS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct CmsConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

impl CmsConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("CMS_BASE_URL")
            .map_err(|_| AppError::BadRequest("CMS_BASE_URL is not set".to_string()))?;
        let api_token = env::var("CMS_API_TOKEN").ok();
        Ok(Self { base_url, api_token })
    }
}

#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Course record keyed by SKU, with its nested units/offers/related
    /// courses populated. `None` when the CMS has no such course.
    async fn course_by_sku(&self, sku: &str)
    -> Result<Option<dto::CmsDocument<dto::CmsCourse>>, AppError>;

    async fn coordinator_by_sku(&self, sku: &str) -> Result<Option<dto::CmsStaff>, AppError>;

    async fn teachers_by_sku(&self, sku: &str) -> Result<Vec<dto::CmsStaff>, AppError>;
}

pub struct CmsHttpClient {
    client: Client,
    config: CmsConfig,
}

impl CmsHttpClient {
    pub fn new(config: CmsConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(CMS_TIMEOUT)
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<dto::CmsResponse<T>, AppError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::from_reqwest("cms", &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("CMS API error {}: {}", status, body)));
        }

        let body_text = response.text().await.unwrap_or_default();
        serde_json::from_str::<dto::CmsResponse<T>>(&body_text).map_err(|e| {
            tracing::error!("Failed to parse CMS response: {}", e);
            AppError::Upstream(format!("Failed to parse CMS response: {}", e))
        })
    }
}

#[async_trait]
impl CmsClient for CmsHttpClient {
    async fn course_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<dto::CmsDocument<dto::CmsCourse>>, AppError> {
        let response = self
            .query::<dto::CmsCourse>(
                "api/courses",
                &[("filters[sku][$eq]", sku), ("populate", "deep")],
            )
            .await?;
        Ok(response.data.into_iter().next())
    }

    async fn coordinator_by_sku(&self, sku: &str) -> Result<Option<dto::CmsStaff>, AppError> {
        let response = self
            .query::<dto::CmsStaff>(
                "api/coordinators",
                &[("filters[course][sku][$eq]", sku), ("populate", "photo")],
            )
            .await?;
        Ok(response.data.into_iter().next().map(|doc| doc.attributes))
    }

    async fn teachers_by_sku(&self, sku: &str) -> Result<Vec<dto::CmsStaff>, AppError> {
        let response = self
            .query::<dto::CmsStaff>(
                "api/teachers",
                &[("filters[courses][sku][$eq]", sku), ("populate", "photo")],
            )
            .await?;
        Ok(response.data.into_iter().map(|doc| doc.attributes).collect())
    }
}

pub struct NoopCmsClient;

#[async_trait]
impl CmsClient for NoopCmsClient {
    async fn course_by_sku(
        &self,
        _sku: &str,
    ) -> Result<Option<dto::CmsDocument<dto::CmsCourse>>, AppError> {
        Ok(None)
    }

    async fn coordinator_by_sku(&self, _sku: &str) -> Result<Option<dto::CmsStaff>, AppError> {
        Ok(None)
    }

    async fn teachers_by_sku(&self, _sku: &str) -> Result<Vec<dto::CmsStaff>, AppError> {
        Ok(Vec::new())
    }
}
